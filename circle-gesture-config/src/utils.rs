use knuffel::errors::DecodeError;

/// Applies a parsed, partially-filled config section on top of a resolved one.
pub trait MergeWith<T> {
    fn merge_with(&mut self, part: &T);

    fn merged_with(mut self, part: &T) -> Self
    where
        Self: Sized,
    {
        self.merge_with(part);
        self
    }

    fn from_part(part: &T) -> Self
    where
        Self: Default + Sized,
    {
        Self::default().merged_with(part)
    }
}

// MIN and MAX generics are only used during parsing to check the value.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FloatOrInt<const MIN: i32, const MAX: i32>(pub f64);

/// Flag, with an optional explicit value.
///
/// Intended to be used as an `Option<Flag>` field, as a tri-state:
/// - (missing): unset, `None`
/// - just `field`: set, `Some(true)`
/// - explicitly `field true` or `field false`: set, `Some(true)` or `Some(false)`
#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flag(#[knuffel(argument, default = true)] pub bool);

impl<const MIN: i32, const MAX: i32> MergeWith<FloatOrInt<MIN, MAX>> for f64 {
    fn merge_with(&mut self, part: &FloatOrInt<MIN, MAX>) {
        *self = part.0;
    }
}

impl MergeWith<Flag> for bool {
    fn merge_with(&mut self, part: &Flag) {
        *self = part.0;
    }
}

impl<S: knuffel::traits::ErrorSpan, const MIN: i32, const MAX: i32> knuffel::DecodeScalar<S>
    for FloatOrInt<MIN, MAX>
{
    fn type_check(
        type_name: &Option<knuffel::span::Spanned<knuffel::ast::TypeName, S>>,
        ctx: &mut knuffel::decode::Context<S>,
    ) {
        if let Some(type_name) = &type_name {
            ctx.emit_error(DecodeError::unexpected(
                type_name,
                "type name",
                "no type name expected for this node",
            ));
        }
    }

    fn raw_decode(
        val: &knuffel::span::Spanned<knuffel::ast::Literal, S>,
        ctx: &mut knuffel::decode::Context<S>,
    ) -> Result<Self, DecodeError<S>> {
        let value = match &**val {
            knuffel::ast::Literal::Int(ref value) => match i32::try_from(value) {
                Ok(v) => f64::from(v),
                Err(e) => {
                    ctx.emit_error(DecodeError::conversion(val, e));
                    return Ok(FloatOrInt::default());
                }
            },
            knuffel::ast::Literal::Decimal(ref value) => match f64::try_from(value) {
                Ok(v) => v,
                Err(e) => {
                    ctx.emit_error(DecodeError::conversion(val, e));
                    return Ok(FloatOrInt::default());
                }
            },
            _ => {
                ctx.emit_error(DecodeError::unsupported(
                    val,
                    "Unsupported value, only numbers are recognized",
                ));
                return Ok(FloatOrInt::default());
            }
        };

        if !(f64::from(MIN)..=f64::from(MAX)).contains(&value) {
            ctx.emit_error(DecodeError::conversion(
                val,
                format!("value must be between {MIN} and {MAX}"),
            ));
            return Ok(FloatOrInt::default());
        }

        Ok(FloatOrInt(value))
    }
}
