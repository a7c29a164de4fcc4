use std::error::Error;

/// Write an error followed by every error in its `source` chain. Meant for
/// `Debug` impls, so that `{:?}` in logs shows the whole chain instead of just
/// the outermost message.
pub fn error_chain_fmt(
    e: &impl Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{e}\n")?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current = cause.source();
    }
    Ok(())
}
