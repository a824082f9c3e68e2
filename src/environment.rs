use std::env;
use std::str::FromStr;

use crate::error::ConfigError;

/// Splits `value` on `delimiter`, trimming items and dropping empty ones.
pub fn split_list(value: &str, delimiter: char) -> Vec<String> {
    value
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// The trimmed value of `var`, or `None` when it is unset or blank.
pub fn get_env_var(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses `var` as `T`, falling back to `default` when it is unset. A value
/// that is set but does not parse is a configuration error.
pub fn get_env_var_parsed<T>(var: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_var(var) {
        Some(value) => parse_value(var, &value),
        None => Ok(default),
    }
}

pub fn parse_value<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(var, value, e.to_string()))
}
