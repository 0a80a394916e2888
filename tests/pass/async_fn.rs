use std::sync::atomic::{AtomicUsize, Ordering};

use addlogging::addlogging;

static EXECUTION_COUNT: AtomicUsize = AtomicUsize::new(0);

#[addlogging]
async fn simple_async() -> i32 {
    EXECUTION_COUNT.fetch_add(1, Ordering::SeqCst);
    42
}

#[addlogging]
async fn fallible_async(raw: &str) -> Result<u8, std::num::ParseIntError> {
    let value = raw.parse()?;
    Ok(value)
}

fn main() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        assert_eq!(simple_async().await, Some(42));
        assert_eq!(EXECUTION_COUNT.load(Ordering::SeqCst), 1);
        assert_eq!(fallible_async("7").await, Some(7));
        assert_eq!(fallible_async("seven").await, None);

        // the wrapped future stays Send
        let handle = tokio::spawn(simple_async());
        assert_eq!(handle.await.unwrap(), Some(42));
    });
}
