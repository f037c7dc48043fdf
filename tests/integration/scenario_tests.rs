//! Admission scenarios
//!
//! Bursts, cooldown escalation and recovery as seen by a single caller.

#[cfg(test)]
mod tests {
    use crate::common::{fixtures::T0, memory_admission};
    use ratewarden::CallerId;

    /// Fire requests at the current clock until one is denied
    async fn drain_until_denied(
        admission: &ratewarden::AdmissionControl,
        path: &str,
        caller: &CallerId,
    ) -> ratewarden::AdmissionOutcome {
        loop {
            let outcome = admission.check(path, caller).await;
            if !outcome.allowed() {
                return outcome;
            }
        }
    }

    /// 30 instant search requests: 25 admitted, then one violation whose cooldown covers the
    /// rest of the burst without escalating
    #[tokio::test]
    async fn test_search_burst_of_thirty() {
        let (admission, _) = memory_admission();
        let caller = CallerId::ip("203.0.113.10");

        let mut outcomes = Vec::new();
        for _ in 0..30 {
            outcomes.push(admission.check("/food/search", &caller).await);
        }

        assert!(outcomes[..25].iter().all(|o| o.allowed()));
        for denied in &outcomes[25..] {
            assert!(!denied.allowed());
            assert_eq!(denied.result.retry_after, 5);
            assert_eq!(denied.result.violations, 1);
        }
    }

    /// Successive violations walk the ladder and clamp at its last entry
    #[tokio::test]
    async fn test_search_escalation_ladder() {
        let (admission, clock) = memory_admission();
        let caller = CallerId::ip("203.0.113.11");

        let mut retries = Vec::new();
        let mut violations = Vec::new();
        for _ in 0..5 {
            let denied = drain_until_denied(&admission, "/food/search", &caller).await;
            retries.push(denied.result.retry_after);
            violations.push(denied.result.violations);
            clock.advance(denied.result.retry_after as f64);
        }

        assert_eq!(retries, vec![5, 10, 60, 300, 300]);
        assert_eq!(violations, vec![1, 2, 3, 4, 5]);
    }

    /// Waiting out the first cooldown readmits without forgetting the violation
    #[tokio::test]
    async fn test_recovery_after_first_cooldown() {
        let (admission, clock) = memory_admission();
        let caller = CallerId::user("user-2");

        for _ in 0..25 {
            assert!(admission.check("/food/search", &caller).await.allowed());
        }
        let denied = admission.check("/food/search", &caller).await;
        assert_eq!(denied.result.violations, 1);

        clock.advance(6.0);
        let outcome = admission.check("/food/search", &caller).await;
        assert!(outcome.allowed());
        assert_eq!(outcome.result.violations, 1);
    }

    /// 8 instant AI requests admit exactly the burst of 5; successive violations escalate
    /// 30, 60, 300
    #[tokio::test]
    async fn test_ai_burst_and_escalation() {
        let (admission, clock) = memory_admission();
        let caller = CallerId::user("user-3");

        let mut admitted = 0;
        for _ in 0..8 {
            if admission.check("/gpt/analyze", &caller).await.allowed() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 5);

        let first = admission.check("/gpt/analyze", &caller).await;
        assert_eq!(first.result.retry_after, 30);
        assert_eq!(first.reset_at, T0 as u64 + 30);

        clock.advance(31.0);
        let second = admission.check("/gpt/analyze", &caller).await;
        assert!(!second.allowed());
        assert_eq!(second.result.retry_after, 60);

        clock.advance(61.0);
        let third = admission.check("/gpt/analyze", &caller).await;
        assert!(!third.allowed());
        assert_eq!(third.result.retry_after, 300);
        assert_eq!(third.result.violations, 3);
    }

    /// Low-rate classes still refill: 30/hour returns a token every two minutes
    #[tokio::test]
    async fn test_ai_refills_one_token_per_two_minutes() {
        let (admission, clock) = memory_admission();
        let caller = CallerId::user("user-4");
        for _ in 0..5 {
            admission.check("/gpt/chat", &caller).await;
        }

        clock.advance(121.0);
        let outcome = admission.check("/gpt/chat", &caller).await;
        assert!(outcome.allowed());
        assert_eq!(outcome.result.tokens_remaining, 0);
        assert_eq!(outcome.result.violations, 0);
    }

    /// Exhausting one caller leaves others, and other classes, untouched
    #[tokio::test]
    async fn test_key_isolation() {
        let (admission, _) = memory_admission();
        let noisy = CallerId::ip("203.0.113.12");
        for _ in 0..100 {
            admission.check("/gpt/chat", &noisy).await;
        }

        assert!(admission.check("/gpt/chat", &CallerId::ip("203.0.113.13")).await.allowed());
        assert!(admission.check("/users/me", &noisy).await.allowed());
    }

    /// Excluded paths stay open after thousands of denials elsewhere
    #[tokio::test]
    async fn test_exclusions_survive_denials() {
        let (admission, _) = memory_admission();
        let caller = CallerId::ip("203.0.113.14");
        for _ in 0..2_000 {
            admission.check("/food/search", &caller).await;
        }

        assert!(admission.should_bypass("/health"));
        assert!(admission.should_bypass("/docs/index.html"));
        assert!(!admission.should_bypass("/food/search"));
    }
}
