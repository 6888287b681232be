/// Unset and blank both mean `None`.
pub(crate) fn optional_trimmed_from_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::optional_trimmed_from_env;
    use crate::test_support::ScopedEnv;

    const VAR: &str = "WAYPOINT_TEST_TRIMMED_ENV";

    #[test]
    fn optional_trimmed_from_env_returns_none_when_unset() {
        let mut env = ScopedEnv::lock();
        env.remove(VAR);

        assert_eq!(optional_trimmed_from_env(VAR), None);
    }

    #[test]
    fn optional_trimmed_from_env_treats_blank_as_unset() {
        let mut env = ScopedEnv::lock();
        env.set(VAR, "   ");

        assert_eq!(optional_trimmed_from_env(VAR), None);
    }

    #[test]
    fn optional_trimmed_from_env_trims_value() {
        let mut env = ScopedEnv::lock();
        env.set(VAR, " waypoint-test ");

        assert_eq!(
            optional_trimmed_from_env(VAR),
            Some("waypoint-test".to_owned())
        );
    }
}
