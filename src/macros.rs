/// Helper macro for building a [`crate::diagnostics::Violation`]
///
/// ```rust, ignore
///  return Err(violation!(DiagnosticCode::NegativeOffset, "offset {} is negative", offset));
/// ```
macro_rules! violation {
    // Single string version
    ($code:expr, $msg:expr) => {
        crate::diagnostics::Violation::new($code, $msg.to_string())
    };

    // Format string with arguments version
    ($code:expr, $fmt:expr, $($arg:tt)*) => {
        crate::diagnostics::Violation::new($code, format!($fmt, $($arg)*))
    };
}
