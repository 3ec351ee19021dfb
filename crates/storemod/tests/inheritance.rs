pub mod fixtures;

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use serde_json::json;
    use std::sync::Arc;
    use storemod::prelude::*;

    fn installed() -> (Arc<SpyHost>, Arc<SecureTokenModule>) {
        let host = SpyHost::new();
        let module = SecureTokenModule::new(host.clone()).install().unwrap();
        (host, module)
    }

    #[test]
    fn test_lineage_runs_from_derived_to_base() {
        let lineage = SecureTokenModule::lineage().unwrap();
        let owners = lineage.owners();

        assert_eq!(owners.len(), 2);
        assert!(owners[0].ends_with("SecureTokenModule"), "{owners:?}");
        assert!(owners[1].ends_with("::TokenModule"), "{owners:?}");
    }

    #[test]
    fn test_registration_merges_ancestor_operations() {
        let (host, _module) = installed();

        let registrations = host.registrations.lock();
        assert_eq!(registrations.len(), 1);
        assert_eq!(registrations[0].getters, ["get_token", "has_prefix", "token"]);
        assert_eq!(registrations[0].mutations, ["clear", "restore", "set_token"]);
        assert_eq!(registrations[0].actions, ["set_special_token"]);
    }

    #[test]
    fn test_derived_getter_overrides_base() {
        let (_host, module) = installed();

        assert_eq!(module.get_token().unwrap(), "secure:initialToken");
        // The base redirect resolves to the same host key, hence to the override.
        assert_eq!(module.parent.get_token().unwrap(), "secure:initialToken");
        assert_eq!(module.parent.current_token().unwrap(), INITIAL_TOKEN);
    }

    #[test]
    fn test_derived_mutation_overrides_base() {
        let (host, module) = installed();

        assert_eq!(module.set_token("abc".to_owned()).unwrap(), "ABC");
        assert_eq!(module.parent.current_token().unwrap(), "ABC");
        assert_eq!(*host.commits.lock(), [("moduleName/set_token".to_owned(), vec![json!("abc")], None)]);
    }

    #[test]
    fn test_inherited_action_reaches_override() {
        let (host, module) = installed();

        module.parent.set_special_token("zz".to_owned()).unwrap();

        assert_eq!(module.parent.current_token().unwrap(), "ZZ");
        assert_eq!(host.dispatches.lock().len(), 1);
    }

    #[test]
    fn test_derived_only_operation() {
        let (_host, module) = installed();

        module.clear().unwrap();

        assert_eq!(module.parent.current_token().unwrap(), "");
        assert!(module.parent.has_prefix(String::new()).unwrap());
    }

    #[test]
    fn test_base_installed_alone_uses_its_own_bodies() {
        let host = SpyHost::new();
        let module = TokenModule::new(host.clone()).install().unwrap();

        assert_eq!(module.get_token().unwrap(), INITIAL_TOKEN);
        assert_eq!(module.set_token("abc".to_owned()).unwrap(), "abc");
        assert!(!host.registrations.lock()[0].mutations.contains(&"clear"));
    }

    #[test]
    fn test_canned_read_skips_the_override() {
        let (host, module) = installed();
        host.answer_reads_with(json!("canned"));

        assert_eq!(module.get_token().unwrap(), "canned");
        assert_eq!(module.parent.body_reads(), 0);
    }
}
