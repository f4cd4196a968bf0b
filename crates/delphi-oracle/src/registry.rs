//! Reporter admission.
//!
//! An account may report if it is on the explicit allow-list or, failing
//! that, if the host currently lists it as an active validator.

use delphi_types::AccountName;

use crate::host::ValidatorSource;
use crate::store::ReporterStore;
use crate::Result;

/// Allow-list plus validator fallback.
pub struct ReporterRegistry {
    validators: Box<dyn ValidatorSource>,
}

impl ReporterRegistry {
    pub fn new(validators: Box<dyn ValidatorSource>) -> Self {
        Self { validators }
    }

    /// Whether `principal` may submit observations.
    pub fn is_qualified<S>(&self, store: &S, principal: AccountName) -> Result<bool>
    where
        S: ReporterStore + ?Sized,
    {
        if store.is_listed(principal)? {
            return Ok(true);
        }
        Ok(self.validators.active_validators().contains(principal))
    }

    /// Replace the allow-list wholesale. An empty list leaves only active
    /// validators qualified.
    pub fn replace_all<S>(&self, store: &mut S, reporters: &[AccountName]) -> Result<()>
    where
        S: ReporterStore + ?Sized,
    {
        store.replace_reporters(reporters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticValidators;
    use crate::store::MemoryStore;

    fn name(s: &str) -> AccountName {
        s.parse().expect("name")
    }

    fn registry(validators: &[&str]) -> ReporterRegistry {
        let names: Vec<AccountName> = validators.iter().map(|s| name(s)).collect();
        ReporterRegistry::new(Box::new(StaticValidators::new(&names)))
    }

    #[test]
    fn test_listed_reporter_qualifies() {
        let reg = registry(&[]);
        let mut store = MemoryStore::new();
        reg.replace_all(&mut store, &[name("feeder")]).expect("replace");
        assert!(reg.is_qualified(&store, name("feeder")).expect("check"));
        assert!(!reg.is_qualified(&store, name("stranger")).expect("check"));
    }

    #[test]
    fn test_validator_qualifies_without_listing() {
        let reg = registry(&["producer1"]);
        let store = MemoryStore::new();
        assert!(reg.is_qualified(&store, name("producer1")).expect("check"));
        assert!(!reg.is_qualified(&store, name("producer2")).expect("check"));
    }

    #[test]
    fn test_empty_list_leaves_validators() {
        let reg = registry(&["producer1"]);
        let mut store = MemoryStore::new();
        reg.replace_all(&mut store, &[name("feeder")]).expect("replace");
        reg.replace_all(&mut store, &[]).expect("replace");
        assert!(!reg.is_qualified(&store, name("feeder")).expect("check"));
        assert!(reg.is_qualified(&store, name("producer1")).expect("check"));
    }

    #[test]
    fn test_replace_discards_previous() {
        let reg = registry(&[]);
        let mut store = MemoryStore::new();
        reg.replace_all(&mut store, &[name("alice"), name("bob")])
            .expect("replace");
        reg.replace_all(&mut store, &[name("carol"), name("carol")])
            .expect("replace");
        assert_eq!(store.listed_reporters().expect("list"), vec![name("carol")]);
    }
}
