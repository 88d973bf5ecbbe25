use super::*;

#[test]
fn test_allows_up_to_the_limit() {
    let limiter = RateLimiter::new(3, Duration::from_secs(60));
    assert!(limiter.try_acquire("1.2.3.4"));
    assert!(limiter.try_acquire("1.2.3.4"));
    assert!(limiter.try_acquire("1.2.3.4"));
    assert!(!limiter.try_acquire("1.2.3.4"));
}

#[test]
fn test_keys_are_independent() {
    let limiter = RateLimiter::new(1, Duration::from_secs(60));
    assert!(limiter.try_acquire("1.2.3.4"));
    assert!(!limiter.try_acquire("1.2.3.4"));
    assert!(limiter.try_acquire("5.6.7.8"));
}

#[test]
fn test_window_resets_after_elapse() {
    let limiter = RateLimiter::new(1, Duration::from_millis(10));
    assert!(limiter.try_acquire("1.2.3.4"));
    assert!(!limiter.try_acquire("1.2.3.4"));

    std::thread::sleep(Duration::from_millis(15));
    assert!(limiter.try_acquire("1.2.3.4"));
}

#[test]
fn test_map_stays_bounded() {
    let limiter = RateLimiter::new(1, Duration::from_secs(3600));
    for i in 0..(MAX_TRACKED_KEYS + 50) {
        limiter.try_acquire(&format!("10.0.{}.{}", i / 256, i % 256));
    }

    let entries = limiter
        .entries
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    assert!(entries.len() <= MAX_TRACKED_KEYS);
}
