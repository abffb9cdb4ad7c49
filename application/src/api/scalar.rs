//! GraphQL scalar definitions.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    GraphQLType, InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
    ScalarValue, Value,
};

/// Helper type to use in `#[graphql(with = ..)]` attribute.
///
/// Represents the target type as a GraphQL string, going through the
/// [`FromStr`] and [`Display`] impls of the domain `As` type, so the domain
/// validation applies to every input value.
///
/// Target type must implement [`TryFrom`] and [`AsRef`] for `As` type.
///
/// [`Display`]: fmt::Display
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Converts the target type into a scalar [`Value`].
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::from(value.as_ref().to_string())
    }

    /// Constructs the target type from a scalar [`Value`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the input value is not a string;
    /// - the input value cannot be parsed into `As` type;
    /// - the parsed value cannot be converted into the target type.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr + fmt::Display,
        As::Err: fmt::Display,
        T: TryFrom<As> + GraphQLType<S, TypeInfo = ()>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let name = type_name::<T, S>();
        let s = input.as_string_value().ok_or_else(|| {
            format!(
                "Cannot parse input scalar `{name}`: expected string input \
                 value, found: {input}",
            )
        })?;
        s.parse::<As>()
            .map_err(|e| {
                format!(
                    "Cannot parse input scalar `{name}` from \"{s}\" string: \
                     {e}",
                )
            })?
            .try_into()
            .map_err(|e| format!("Cannot parse input scalar `{name}`: {e}"))
    }

    /// Parses the provided [`ScalarToken`].
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be parsed as [`String`].
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}

/// Returns the GraphQL name of the `T` type.
fn type_name<T, S>() -> String
where
    T: GraphQLType<S, TypeInfo = ()>,
    S: ScalarValue,
{
    T::name(&()).unwrap_or("<unnamed>").to_owned()
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, InputValue, Value};
    use service::domain;

    use crate::api::seat::Number;

    use super::Via;

    type SeatVia = Via<domain::seat::Number>;

    #[test]
    fn parses_valid_string() {
        let input = InputValue::<DefaultScalarValue>::scalar("B12");

        let number: Number =
            SeatVia::from_input(&input).expect("valid seat number");

        assert_eq!(number.to_string(), "B12");
    }

    #[test]
    fn rejects_invalid_string() {
        let input = InputValue::<DefaultScalarValue>::scalar(" B12");

        let err = SeatVia::from_input::<Number, _>(&input).unwrap_err();

        assert!(err.contains("`SeatNumber`"), "{err}");
        assert!(err.contains("\" B12\""), "{err}");
    }

    #[test]
    fn rejects_non_string_input() {
        let input = InputValue::<DefaultScalarValue>::scalar(12);

        let err = SeatVia::from_input::<Number, _>(&input).unwrap_err();

        assert!(err.contains("expected string input"), "{err}");
    }

    #[test]
    fn outputs_display_form() {
        let number = Number::from(domain::seat::Number::new("C3").unwrap());

        let out: Value<DefaultScalarValue> = SeatVia::to_output(&number);

        assert_eq!(out, Value::scalar("C3".to_owned()));
    }
}
