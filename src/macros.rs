// ============================================================================
// spark-view - Ergonomic Macros
// ============================================================================

/// Build an ordered field list for [`AppOptions::fields`](crate::AppOptions::fields).
///
/// Values go through `Value::from`, so anything convertible works.
///
/// # Usage
///
/// ```rust
/// use spark_view::{data, AppOptions, Value};
///
/// let fields = data! {
///     "count" => 0,
///     "name" => "Ann",
///     "visible" => true,
/// };
/// assert_eq!(fields[1], ("name".to_string(), Value::from("Ann")));
///
/// let options = AppOptions::new().fields(fields);
/// assert_eq!(options.field_names(), vec!["count", "name", "visible"]);
/// ```
#[macro_export]
macro_rules! data {
    () => {
        ::std::vec::Vec::<(::std::string::String, $crate::Value)>::new()
    };
    ($($field:expr => $value:expr),+ $(,)?) => {
        ::std::vec![
            $( (::std::string::String::from($field), $crate::Value::from($value)) ),+
        ]
    };
}

#[cfg(test)]
mod tests {
    use crate::Value;

    #[test]
    fn data_macro_keeps_order_and_converts() {
        let fields = data! { "b" => 2, "a" => "x" };
        assert_eq!(
            fields,
            vec![
                ("b".to_string(), Value::from(2)),
                ("a".to_string(), Value::from("x")),
            ]
        );
        assert!(data! {}.is_empty());
    }
}
