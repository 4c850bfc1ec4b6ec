use anyhow::Result;

/// Every user action and every backend response is processed to completion before the next one,
/// so the whole application runs on a single thread.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
