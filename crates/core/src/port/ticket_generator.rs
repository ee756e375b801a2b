// Ticket Generator Port (for deterministic testing)

use super::time_provider::TimeProvider;
use rand::Rng;
use std::sync::Arc;

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const RANDOM_SUFFIX_LEN: usize = 3;

/// Ticket generator interface (allows deterministic tickets in tests)
///
/// Uniqueness is enforced by the store; a duplicate insert fails with a conflict.
pub trait TicketGenerator: Send + Sync {
    fn generate_ticket(&self) -> String;
}

/// `<millis in base 36>-<3 random base-36 chars>`, e.g. `M1ABCD2E-7QX`
pub struct TimeRandomTicketGenerator {
    time_provider: Arc<dyn TimeProvider>,
}

impl TimeRandomTicketGenerator {
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self { time_provider }
    }
}

impl TicketGenerator for TimeRandomTicketGenerator {
    fn generate_ticket(&self) -> String {
        let millis = self.time_provider.now_millis().max(0) as u64;
        let mut rng = rand::thread_rng();
        let suffix: String = (0..RANDOM_SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        format!("{}-{}", to_base36(millis), suffix)
    }
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

pub mod mocks {
    use super::TicketGenerator;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Yields T-0001, T-0002, ...
    #[derive(Default)]
    pub struct SequentialTicketGenerator {
        next: AtomicU64,
    }

    impl SequentialTicketGenerator {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl TicketGenerator for SequentialTicketGenerator {
        fn generate_ticket(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
            format!("T-{:04}", n)
        }
    }

    /// Always returns the same ticket (for uniqueness tests)
    pub struct FixedTicketGenerator(pub String);

    impl TicketGenerator for FixedTicketGenerator {
        fn generate_ticket(&self) -> String {
            self.0.clone()
        }
    }
}
