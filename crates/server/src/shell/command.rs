//! Command parsing.
//!
//! One line of input becomes one [`Command`]. Lines that do not start with
//! `/` are not commands at all and parse to [`Command::NoOp`].
//!
//! Patterns are tried in a fixed order: `/products`, `/sell`, `/add`,
//! `/cart`, `/help`, `/exit`. The first match wins; anything else starting
//! with `/` is [`Command::Unrecognized`].

use terminal_shop_core::{Price, PriceError};

/// The command sigil.
pub const SIGIL: char = '/';

/// A classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Empty line or plain text; produces no output.
    NoOp,
    /// Show the help text.
    Help,
    /// Show the catalog.
    ListCatalog,
    /// List an item for sale.
    Sell {
        /// Item name.
        name: String,
        /// Asking price.
        price: Price,
    },
    /// Add a catalog item to its seller's cart.
    AddToCart {
        /// Catalog ID as typed.
        item_id: String,
        /// Catalog name as typed.
        item_name: String,
    },
    /// Show the caller's cart.
    ViewCart,
    /// Leave the shell.
    Exit,
    /// Starts with `/` but matches nothing.
    Unrecognized,
}

/// Errors reported while extracting command arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// `/sell` had the right shape but an unusable price.
    #[error("error converting price: {0}")]
    InvalidPrice(#[from] PriceError),
}

/// Classify one line of input.
///
/// # Errors
///
/// Returns [`ParseError::InvalidPrice`] when a `/sell` line has the
/// `-name=` / `-price=` shape but the price is not a non-negative decimal.
pub fn parse(line: &str) -> Result<Command, ParseError> {
    if !line.starts_with(SIGIL) {
        return Ok(Command::NoOp);
    }

    if line.starts_with("/products") {
        return Ok(Command::ListCatalog);
    }
    if let Some(sell) = parse_sell(line) {
        return sell;
    }
    if let Some(add) = parse_add(line) {
        return Ok(add);
    }
    if line.starts_with("/cart") {
        return Ok(Command::ViewCart);
    }
    if line.starts_with("/help") {
        return Ok(Command::Help);
    }
    if line.starts_with("/exit") {
        return Ok(Command::Exit);
    }

    Ok(Command::Unrecognized)
}

/// `/sell -name=<token> -price=<number>`, nothing before or after.
fn parse_sell(line: &str) -> Option<Result<Command, ParseError>> {
    let mut tokens = line.split_whitespace();

    if tokens.next()? != "/sell" {
        return None;
    }
    let name = flag_value(tokens.next()?, "-name=")?;
    let price = flag_value(tokens.next()?, "-price=")?;
    if tokens.next().is_some() {
        return None;
    }

    Some(
        Price::parse(price)
            .map(|price| Command::Sell {
                name: name.to_owned(),
                price,
            })
            .map_err(ParseError::from),
    )
}

/// `/add -id=<token> -name=<token>`, anything after the name is ignored.
fn parse_add(line: &str) -> Option<Command> {
    let mut tokens = line.split_whitespace();

    if tokens.next()? != "/add" {
        return None;
    }
    let item_id = flag_value(tokens.next()?, "-id=")?;
    let item_name = flag_value(tokens.next()?, "-name=")?;

    Some(Command::AddToCart {
        item_id: item_id.to_owned(),
        item_name: item_name.to_owned(),
    })
}

/// The non-empty value of a `-flag=value` token.
fn flag_value<'a>(token: &'a str, flag: &str) -> Option<&'a str> {
    token.strip_prefix(flag).filter(|value| !value.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sell(name: &str, price: &str) -> Command {
        Command::Sell {
            name: name.to_owned(),
            price: Price::parse(price).unwrap(),
        }
    }

    fn add(id: &str, name: &str) -> Command {
        Command::AddToCart {
            item_id: id.to_owned(),
            item_name: name.to_owned(),
        }
    }

    #[test]
    fn test_non_commands_are_noop() {
        for line in ["", "hello", " /help", "help", "\t/exit"] {
            assert_eq!(parse(line).unwrap(), Command::NoOp, "line {line:?}");
        }
    }

    #[test]
    fn test_prefix_commands() {
        assert_eq!(parse("/help").unwrap(), Command::Help);
        assert_eq!(parse("/helpme").unwrap(), Command::Help);
        assert_eq!(parse("/exit").unwrap(), Command::Exit);
        assert_eq!(parse("/exit now").unwrap(), Command::Exit);
        assert_eq!(parse("/products").unwrap(), Command::ListCatalog);
        assert_eq!(parse("/products --all").unwrap(), Command::ListCatalog);
        assert_eq!(parse("/cart").unwrap(), Command::ViewCart);
        assert_eq!(parse("/carts").unwrap(), Command::ViewCart);
    }

    #[test]
    fn test_unknown_slash_command() {
        assert_eq!(parse("/").unwrap(), Command::Unrecognized);
        assert_eq!(parse("/buy 1").unwrap(), Command::Unrecognized);
        assert_eq!(parse("/HELP").unwrap(), Command::Unrecognized);
    }

    #[test]
    fn test_sell_valid() {
        assert_eq!(
            parse("/sell -name=lamp -price=12").unwrap(),
            sell("lamp", "12")
        );
        assert_eq!(
            parse("/sell   -name=old-lamp   -price=12.50").unwrap(),
            sell("old-lamp", "12.50")
        );
        assert_eq!(
            parse("/sell -name=café -price=0").unwrap(),
            sell("café", "0")
        );
    }

    #[test]
    fn test_sell_wrong_shape_is_unrecognized() {
        for line in [
            "/sell",
            "/sell -name=lamp",
            "/sell -price=3 -name=lamp",
            "/sell -name= -price=3",
            "/sell -name=lamp -price=",
            "/sell -name=lamp -price=3 extra",
            "/sell -title=lamp -price=3",
            "/sellx -name=lamp -price=3",
        ] {
            assert_eq!(parse(line).unwrap(), Command::Unrecognized, "line {line:?}");
        }
    }

    #[test]
    fn test_sell_bad_price_is_format_error() {
        for line in [
            "/sell -name=lamp -price=abc",
            "/sell -name=lamp -price=-3",
            "/sell -name=lamp -price=1.2.3",
            "/sell -name=lamp -price=1e5",
        ] {
            assert!(
                matches!(parse(line), Err(ParseError::InvalidPrice(_))),
                "line {line:?}"
            );
        }
    }

    #[test]
    fn test_sell_price_error_message() {
        let err = parse("/sell -name=lamp -price=abc").unwrap_err();
        assert!(err.to_string().starts_with("error converting price:"));
    }

    #[test]
    fn test_add_valid() {
        assert_eq!(parse("/add -id=1 -name=lamp").unwrap(), add("1", "lamp"));
        assert_eq!(parse("/add  -id=7   -name=mug").unwrap(), add("7", "mug"));
    }

    #[test]
    fn test_add_ignores_trailing_content() {
        assert_eq!(
            parse("/add -id=1 -name=lamp please hurry").unwrap(),
            add("1", "lamp")
        );
    }

    #[test]
    fn test_add_wrong_shape_is_unrecognized() {
        for line in [
            "/add",
            "/add -id=1",
            "/add -name=lamp -id=1",
            "/add -id= -name=lamp",
            "/add -id=1 -name=",
            "/addx -id=1 -name=lamp",
        ] {
            assert_eq!(parse(line).unwrap(), Command::Unrecognized, "line {line:?}");
        }
    }

    #[test]
    fn test_add_keeps_tokens_verbatim() {
        assert_eq!(
            parse("/add -id=abc -name=a=b").unwrap(),
            add("abc", "a=b")
        );
    }

    #[test]
    fn test_priority_order() {
        // `/products` is tried before everything else.
        assert_eq!(parse("/products/help").unwrap(), Command::ListCatalog);
        // `/cart` wins over `/help` and `/exit` for its own prefix.
        assert_eq!(parse("/cart/exit").unwrap(), Command::ViewCart);
        // `/help` is tried before `/exit`.
        assert_eq!(parse("/help/exit").unwrap(), Command::Help);
        // A malformed `/sell` does not fall into another command.
        assert_eq!(parse("/sell/help").unwrap(), Command::Unrecognized);
    }
}
