//! Item transforms for `map` / `transform`.

use std::fmt;
use std::sync::Arc;

use dept_types::Item;

/// Signature of a transform body. `Err` carries a message for the user.
pub type TransformFn = dyn Fn(&Item) -> Result<Item, String> + Send + Sync;

/// Names accepted at the prompt, e.g. `map(upper)`.
pub const BUILTIN_TRANSFORMS: &[&str] = &["upper", "lower", "trim", "len", "text", "number"];

/// A named per-item function.
#[derive(Clone)]
pub struct Transform {
    name: String,
    func: Arc<TransformFn>,
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transform").field(&self.name).finish()
    }
}

impl Transform {
    /// Wrap an arbitrary closure.
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&Item) -> Result<Item, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Look up a built-in transform by name.
    pub fn builtin(name: &str) -> Option<Self> {
        let transform = match name {
            "upper" => Self::new(name, |item| Ok(Item::Text(item.to_text().to_uppercase()))),
            "lower" => Self::new(name, |item| Ok(Item::Text(item.to_text().to_lowercase()))),
            "trim" => Self::new(name, |item| Ok(Item::Text(item.to_text().trim().to_string()))),
            "text" => Self::new(name, |item| Ok(Item::Text(item.to_text()))),
            "len" => Self::new(name, |item| match item {
                Item::Text(s) => Ok(Item::Number(s.chars().count() as f64)),
                Item::List(items) => Ok(Item::Number(items.len() as f64)),
                Item::Bytes(bytes) => Ok(Item::Number(bytes.len() as f64)),
                other => Err(format!("{} has no length", other.kind())),
            }),
            "number" => Self::new(name, |item| match item {
                Item::Number(n) => Ok(Item::Number(*n)),
                other => {
                    let text = other.to_text();
                    text.trim()
                        .parse::<f64>()
                        .map(Item::Number)
                        .map_err(|_| format!("not a number: {text:?}"))
                }
            }),
            _ => return None,
        };
        Some(transform)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, item: &Item) -> Result<Item, String> {
        (self.func)(item)
    }
}
