use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use memo_cache::{BoxError, Cache};

const PRODUCER_DELAY_MS: u64 = 100;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let invocations = Arc::new(AtomicUsize::new(0));
    let counter = invocations.clone();

    let cache = Arc::new(Cache::new(move |key: u64| {
        let counter = counter.clone();
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(PRODUCER_DELAY_MS)).await;
            if key == 0 {
                return Err(Box::new(std::io::Error::other("key 0 is not computable")) as BoxError);
            }
            Ok(key * key)
        })
    }));

    println!("Computing value for key 7...");
    let value = cache.get(7).await?;
    println!("Got: {}", value);

    println!("Requesting key 7 again (memoized)...");
    let value = cache.get(7).await?;
    println!("Got: {}", value);

    println!("Requesting key 9 from 10 concurrent tasks...");
    let mut handles = Vec::new();
    for _ in 0..10 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move { cache.get(9).await }));
    }
    for handle in handles {
        println!("Got: {}", handle.await??);
    }

    println!("Requesting the failing key 0 twice...");
    for _ in 0..2 {
        match cache.get(0).await {
            Ok(value) => println!("Got: {}", value),
            Err(err) => println!("Error: {}", err),
        }
    }

    println!("Cache size: {}", cache.size());
    println!(
        "Producer invocations: {}",
        invocations.load(Ordering::SeqCst)
    );

    Ok(())
}
