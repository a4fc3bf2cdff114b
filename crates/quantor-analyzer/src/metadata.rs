use std::collections::HashSet;

use rustpython_parser::ast::{self, Constant, Expr, Stmt};
use rustpython_parser::Parse;

use quantor_model::{BarSize, Cadence, ExecutionTiming, StrategyMetadata};

const MAX_TICKER_LEN: usize = 12;
const MAX_UNIVERSE_SIZE: usize = 200;

/// Everything that can go wrong extracting `universe`/`cadence` from a
/// strategy class body. Each variant renders the same guidance the original
/// implementation gave so a strategy author sees a familiar message.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Strategy has a syntax error: {0}")]
    Syntax(String),
    #[error("No strategy class with 'universe' found. Define it as a class variable: universe = [\"SPY\", \"IEF\"]")]
    NoUniverse,
    #[error("{class_name}.universe must be a list literal of ticker strings. e.g. universe = [\"SPY\", \"IEF\"]")]
    UniverseNotLiteral { class_name: String },
    #[error("{class_name}.universe must not be empty")]
    UniverseEmpty { class_name: String },
    #[error("{class_name}.universe has invalid tickers:\n{details}")]
    UniverseInvalidTickers { class_name: String, details: String },
    #[error("{class_name}.universe has {count} tickers (max {MAX_UNIVERSE_SIZE})")]
    UniverseTooLarge { class_name: String, count: usize },
    #[error("{class_name}.cadence must be a Cadence(...) call. e.g. cadence = Cadence(bar_size=BarSize.DAILY)")]
    CadenceNotCall { class_name: String },
    #[error("{class_name}.cadence arguments must be BarSize.X or ExecutionTiming.Y, not variables or function calls")]
    CadenceArgNotEnumAttr { class_name: String },
    #[error("{class_name}.cadence: unknown bar_size '{value}'")]
    UnknownBarSize { class_name: String, value: String },
    #[error("{class_name}.cadence: unknown execution '{value}'")]
    UnknownExecution { class_name: String, value: String },
    #[error("{class_name}.cadence: unknown argument '{arg}'")]
    UnknownCadenceArg { class_name: String, arg: String },
}

/// Parse strategy source and extract `universe`/`cadence` from the first
/// class that assigns a `universe` class variable. No code is executed.
pub fn extract_metadata(source: &str) -> Result<StrategyMetadata, MetadataError> {
    let suite = ast::Suite::parse(source, "<strategy>")
        .map_err(|e| MetadataError::Syntax(e.to_string()))?;

    for stmt in &suite {
        if let Stmt::ClassDef(class) = stmt {
            let mut universe_node = None;
            let mut cadence_node = None;

            for item in &class.body {
                if let Stmt::Assign(assign) = item {
                    for target in &assign.targets {
                        if let Expr::Name(name) = target {
                            match name.id.as_str() {
                                "universe" => universe_node = Some(assign.value.as_ref()),
                                "cadence" => cadence_node = Some(assign.value.as_ref()),
                                _ => {}
                            }
                        }
                    }
                }
            }

            let Some(universe_node) = universe_node else {
                continue;
            };

            let universe = parse_universe(universe_node, &class.name)?;
            let cadence = match cadence_node {
                Some(node) => parse_cadence(node, &class.name)?,
                None => Cadence::default(),
            };
            return Ok(StrategyMetadata { universe, cadence });
        }
    }

    Err(MetadataError::NoUniverse)
}

fn parse_universe(node: &Expr, class_name: &str) -> Result<Vec<String>, MetadataError> {
    let Expr::List(list) = node else {
        return Err(MetadataError::UniverseNotLiteral {
            class_name: class_name.to_string(),
        });
    };

    if list.elts.is_empty() {
        return Err(MetadataError::UniverseEmpty {
            class_name: class_name.to_string(),
        });
    }

    let mut cleaned = Vec::new();
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for (i, item) in list.elts.iter().enumerate() {
        let Expr::Constant(c) = item else {
            errors.push(format!("  universe[{i}]: expected string literal"));
            continue;
        };
        let Constant::Str(raw) = &c.value else {
            errors.push(format!("  universe[{i}]: expected string literal"));
            continue;
        };

        let ticker = raw.trim().to_uppercase();
        if ticker.is_empty() {
            errors.push(format!("  universe[{i}]: empty or whitespace-only ticker"));
        } else if ticker.len() > MAX_TICKER_LEN {
            errors.push(format!(
                "  universe[{i}]: '{ticker}' exceeds {MAX_TICKER_LEN} characters"
            ));
        } else if seen.contains(&ticker) {
            continue;
        } else {
            seen.insert(ticker.clone());
            cleaned.push(ticker);
        }
    }

    if !errors.is_empty() {
        return Err(MetadataError::UniverseInvalidTickers {
            class_name: class_name.to_string(),
            details: errors.join("\n"),
        });
    }

    if cleaned.len() > MAX_UNIVERSE_SIZE {
        return Err(MetadataError::UniverseTooLarge {
            class_name: class_name.to_string(),
            count: cleaned.len(),
        });
    }

    Ok(cleaned)
}

fn parse_cadence(node: &Expr, class_name: &str) -> Result<Cadence, MetadataError> {
    let Expr::Call(call) = node else {
        return Err(MetadataError::CadenceNotCall {
            class_name: class_name.to_string(),
        });
    };

    let func_name = match call.func.as_ref() {
        Expr::Name(n) => Some(n.id.as_str()),
        Expr::Attribute(a) => Some(a.attr.as_str()),
        _ => None,
    };
    if func_name != Some("Cadence") {
        return Err(MetadataError::CadenceNotCall {
            class_name: class_name.to_string(),
        });
    }

    let mut bar_size = BarSize::default();
    let mut execution = ExecutionTiming::default();

    for kw in &call.keywords {
        let Some(arg) = &kw.arg else {
            return Err(MetadataError::CadenceArgNotEnumAttr {
                class_name: class_name.to_string(),
            });
        };
        let attr = resolve_enum_attr(&kw.value, class_name)?;

        match arg.as_str() {
            "bar_size" => {
                bar_size = BarSize::from_member_name(&attr).ok_or_else(|| {
                    MetadataError::UnknownBarSize {
                        class_name: class_name.to_string(),
                        value: attr.clone(),
                    }
                })?;
            }
            "execution" => {
                execution = ExecutionTiming::from_member_name(&attr).ok_or_else(|| {
                    MetadataError::UnknownExecution {
                        class_name: class_name.to_string(),
                        value: attr.clone(),
                    }
                })?;
            }
            other => {
                return Err(MetadataError::UnknownCadenceArg {
                    class_name: class_name.to_string(),
                    arg: other.to_string(),
                })
            }
        }
    }

    Ok(Cadence { bar_size, execution })
}

fn resolve_enum_attr(node: &Expr, class_name: &str) -> Result<String, MetadataError> {
    if let Expr::Attribute(a) = node {
        if matches!(a.value.as_ref(), Expr::Name(_)) {
            return Ok(a.attr.to_string());
        }
    }
    Err(MetadataError::CadenceArgNotEnumAttr {
        class_name: class_name.to_string(),
    })
}
