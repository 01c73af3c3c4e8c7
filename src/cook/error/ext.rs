//! Extension trait for adding context to Results
//!
//! Provides convenient methods for wrapping errors with context messages.

use stillwater::ContextError;

/// Extension trait for adding context to Results
///
/// # Examples
///
/// ```
/// use prodigy::cook::error::{ResultExt, ContextResult};
///
/// fn process_file(path: &str) -> ContextResult<String, std::io::Error> {
///     let _content = std::fs::read_to_string(path)
///         .context("Reading input file")?;
///     Ok("data".to_string())
/// }
/// ```
pub trait ResultExt<T, E> {
    /// Add static context to error
    ///
    /// Use this when the context message is known at compile time.
    ///
    /// # Examples
    ///
    /// ```
    /// use prodigy::cook::error::{ResultExt, ContextResult};
    /// use stillwater::ContextError;
    ///
    /// fn do_something() -> Result<(), std::io::Error> {
    ///     Ok(())
    /// }
    ///
    /// fn example() -> Result<(), ContextError<std::io::Error>> {
    ///     do_something()
    ///         .context("Operation description")?;
    ///     Ok(())
    /// }
    /// ```
    fn context(self, msg: impl Into<String>) -> Result<T, ContextError<E>>;

    /// Add dynamic context to error
    ///
    /// Use this when the context message needs to be computed at runtime.
    /// The closure is only evaluated if an error occurs, making it zero-cost
    /// in the success path.
    ///
    /// # Examples
    ///
    /// ```
    /// use prodigy::cook::error::{ResultExt, ContextResult};
    /// use stillwater::ContextError;
    ///
    /// fn do_something_with_id(id: &str) -> Result<(), std::io::Error> {
    ///     Ok(())
    /// }
    ///
    /// fn example(id: &str) -> Result<(), ContextError<std::io::Error>> {
    ///     do_something_with_id(id)
    ///         .with_context(|| format!("Processing item {}", id))?;
    ///     Ok(())
    /// }
    /// ```
    fn with_context<F>(self, f: F) -> Result<T, ContextError<E>>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn context(self, msg: impl Into<String>) -> Result<T, ContextError<E>> {
        self.map_err(|e| ContextError::new(e).context(msg))
    }

    fn with_context<F>(self, f: F) -> Result<T, ContextError<E>>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| ContextError::new(e).context(f()))
    }
}

/// Alias for context-aware results
///
/// Use this type alias for functions that return context-aware errors.
///
/// # Examples
///
/// ```
/// use prodigy::cook::error::ContextResult;
///
/// fn process_item(id: &str) -> ContextResult<String, std::io::Error> {
///     // ... implementation
///     Ok("result".to_string())
/// }
/// ```
pub type ContextResult<T, E> = Result<T, ContextError<E>>;
