//! `Data`: the synchronous value container and the canonical algebra.

use dept_types::{format_number, parse_float_prefix, Item};

use super::fanout::{Branch, Fanout, Origin};
use super::{io, Container};
use crate::error::{PipelineError, PipelineResult};
use crate::ops::{split_lines, Op, Pattern, Pipeline, Transform};
use crate::session::Session;

/// An ordered sequence of items.
///
/// Operations never mutate the receiver; each returns a new container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Data {
    items: Vec<Item>,
}

impl Data {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Each item's text form.
    pub fn texts(&self) -> Vec<String> {
        self.items.iter().map(Item::to_text).collect()
    }

    fn map_items(&self, f: impl FnMut(&Item) -> Item) -> Data {
        self.items.iter().map(f).collect()
    }

    fn try_map_items(
        &self,
        op: &'static str,
        mut f: impl FnMut(&Item) -> Result<Item, String>,
    ) -> PipelineResult<Data> {
        self.items
            .iter()
            .map(|item| f(item).map_err(|message| PipelineError::user(op, message)))
            .collect()
    }

    fn split_with(&self, pattern: &Pattern) -> Data {
        self.map_items(|item| {
            Item::List(
                pattern
                    .split(&item.to_text())
                    .into_iter()
                    .map(Item::Text)
                    .collect(),
            )
        })
    }

    fn flattened(&self) -> Data {
        let mut out = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match item {
                Item::List(inner) => out.extend(inner.iter().cloned()),
                Item::Bytes(bytes) => out.extend(bytes.iter().map(|b| Item::Number(f64::from(*b)))),
                other => out.extend(other.to_text().chars().map(|c| Item::Text(c.to_string()))),
            }
        }
        Data::new(out)
    }

    /// One singleton branch per item; a list item becomes its own branch
    /// contents as-is.
    pub(crate) fn fan_out(&self) -> Fanout {
        self.items
            .iter()
            .map(|item| match item {
                Item::List(inner) => (Origin::List, Branch::Value(Data::new(inner.clone()))),
                other => (Origin::Item, Branch::Value(Data::new(vec![other.clone()]))),
            })
            .collect()
    }

    /// Fails if `op` would be rejected before starting any I/O.
    pub(crate) fn precheck(&self, op: &Op, session: &Session) -> PipelineResult<()> {
        io::precheck(op, self, session)
    }

    fn spliced(&self, at: i64, count: i64) -> Data {
        let len = self.items.len() as i64;
        let start = if at < 0 { (len + at).max(0) } else { at.min(len) };
        let count = count.clamp(0, len - start);
        let (start, end) = (start as usize, (start + count) as usize);
        Data::new(self.items[start..end].to_vec())
    }

    fn item_at(&self, index: i64) -> Data {
        let item = usize::try_from(index)
            .ok()
            .and_then(|i| self.items.get(i))
            .cloned()
            .unwrap_or(Item::Undefined);
        Data::new(vec![item])
    }

    fn reversed(&self) -> Data {
        self.items.iter().rev().cloned().collect()
    }
}

fn offset_item(item: &Item, by: f64) -> Result<Item, String> {
    match item {
        Item::Number(n) => Ok(Item::Number(n + by)),
        Item::Undefined => Ok(Item::Number(f64::NAN)),
        Item::Text(_) | Item::List(_) => Ok(Item::Text(item.to_text() + &format_number(by))),
        other => Err(format!("cannot offset {}", other.kind())),
    }
}

fn map_with(data: &Data, op: &'static str, f: &Transform) -> PipelineResult<Data> {
    data.try_map_items(op, |item| f.apply(item))
}

impl Pipeline for Data {
    type Output = PipelineResult<Container>;

    fn apply(&self, op: Op, session: &Session) -> Self::Output {
        let name = op.name();
        tracing::debug!(op = name, items = self.items.len(), "apply");
        self.precheck(&op, session)?;

        let data = match op {
            Op::Copy {} => self.clone(),
            Op::Print {} => {
                session.emit(&session.render(self));
                self.clone()
            }
            Op::Load {} => session.load(self.clone()),
            Op::Split { delimiter } => self.split_with(&delimiter),
            Op::Lines {} => self.map_items(|item| {
                Item::List(split_lines(&item.to_text()).into_iter().map(Item::Text).collect())
            }),
            Op::Chars {} => self.split_with(&Pattern::Literal(String::new())),
            Op::Flatten {} => self.flattened(),
            Op::Show {} => {
                session.emit(&self.texts().join(&session.config().separator));
                self.clone()
            }
            Op::Each {} => return Ok(Container::Fanout(self.fan_out())),
            Op::Splice { at, count } => self.spliced(at, count),
            Op::At { index } => self.item_at(index),
            Op::Replace { pattern, with } => {
                self.map_items(|item| Item::Text(pattern.replace(&item.to_text(), &with)))
            }
            Op::Float {} => self.map_items(|item| Item::Number(parse_float_prefix(&item.to_text()))),
            Op::Offset { by } => self.try_map_items(name, |item| offset_item(item, by))?,
            Op::Map { f } | Op::Transform { f } => map_with(self, name, &f)?,
            Op::Join { delimiter } => Data::new(vec![Item::Text(self.texts().join(&delimiter))]),
            Op::WriteFile { path } => {
                return Ok(Container::Deferred(io::write_file(self, session, path)));
            }
            Op::Files {} => {
                session.register_files(self.clone());
                self.clone()
            }
            Op::Write {} => return io::write(self, session).map(Container::Deferred),
            Op::Rename {} => return io::rename(self, session).map(Container::Deferred),
            Op::Date {} => return Ok(Container::Deferred(io::date(self, session))),
            Op::Read {} => return Ok(Container::Deferred(io::read(self, session))),
            Op::Delete {} => return Ok(Container::Deferred(io::delete(self, session))),
            Op::Reverse {} => self.reversed(),
        };

        Ok(Container::Value(data))
    }
}

impl<T: Into<Item>> From<Vec<T>> for Data {
    fn from(items: Vec<T>) -> Self {
        Data::new(items.into_iter().map(Into::into).collect())
    }
}

impl FromIterator<Item> for Data {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Data::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::session::BufferConsole;
    use rstest::rstest;
    use std::sync::Arc;

    fn session() -> (Session, Arc<BufferConsole>) {
        let console = Arc::new(BufferConsole::new());
        (Session::new(SessionConfig::memory(), console.clone()), console)
    }

    fn value(container: Container) -> Data {
        match container {
            Container::Value(data) => data,
            other => panic!("expected a value container, got {}", other.kind()),
        }
    }

    fn text(s: &str) -> Item {
        Item::from(s)
    }

    #[test]
    fn test_split_then_flatten() {
        let (s, _) = session();
        let split = value(Data::from(vec!["a,b", "c,d"]).split(&s, ",").unwrap());
        assert_eq!(
            split.items(),
            &[
                Item::List(vec![text("a"), text("b")]),
                Item::List(vec![text("c"), text("d")]),
            ]
        );

        let flat = value(split.flatten(&s).unwrap());
        assert_eq!(flat, Data::from(vec!["a", "b", "c", "d"]));
    }

    #[test]
    fn test_receiver_is_not_mutated() {
        let (s, _) = session();
        let original = Data::from(vec!["b", "a"]);
        let _ = original.reverse(&s).unwrap();
        let _ = original.splice(&s, 0, 1).unwrap();
        assert_eq!(original, Data::from(vec!["b", "a"]));
    }

    #[test]
    fn test_flatten_expands_scalars() {
        let (s, _) = session();
        let data = Data::new(vec![text("hi"), Item::from(12), Item::Bytes(vec![7])]);
        let flat = value(data.flatten(&s).unwrap());
        assert_eq!(
            flat.items(),
            &[text("h"), text("i"), text("1"), text("2"), Item::Number(7.0)]
        );
    }

    #[test]
    fn test_lines_and_chars() {
        let (s, _) = session();
        let lines = value(Data::from(vec!["a\r\nb"]).lines(&s).unwrap());
        assert_eq!(lines.items(), &[Item::List(vec![text("a"), text("b")])]);

        let chars = value(Data::from(vec!["ab"]).chars(&s).unwrap());
        assert_eq!(chars.items(), &[Item::List(vec![text("a"), text("b")])]);
    }

    #[rstest]
    #[case(0, vec![Item::from(10)])]
    #[case(2, vec![Item::from(30)])]
    #[case(3, vec![Item::Undefined])]
    #[case(-1, vec![Item::Undefined])]
    fn test_at(#[case] index: i64, #[case] expected: Vec<Item>) {
        let (s, _) = session();
        let data = Data::from(vec![10, 20, 30]);
        assert_eq!(value(data.at(&s, index).unwrap()).into_items(), expected);
    }

    #[rstest]
    #[case(1, 1, vec!["b"])]
    #[case(1, 5, vec!["b", "c"])]
    #[case(-2, 1, vec!["b"])]
    #[case(9, 1, vec![])]
    #[case(0, -3, vec![])]
    fn test_splice(#[case] at: i64, #[case] count: i64, #[case] expected: Vec<&str>) {
        let (s, _) = session();
        let data = Data::from(vec!["a", "b", "c"]);
        assert_eq!(value(data.splice(&s, at, count).unwrap()), Data::from(expected));
    }

    #[test]
    fn test_replace_and_join() {
        let (s, _) = session();
        let data = Data::from(vec!["a-b-c", "d-e"]);
        let replaced = value(data.replace(&s, "-", "+").unwrap());
        assert_eq!(replaced, Data::from(vec!["a+b-c", "d+e"]));

        let joined = value(data.join(&s, " | ").unwrap());
        assert_eq!(joined, Data::from(vec!["a-b-c | d-e"]));
    }

    #[test]
    fn test_replace_regex() {
        let (s, _) = session();
        let data = Data::from(vec!["a-b-c"]);
        let pattern = Pattern::regex("-").unwrap();
        assert_eq!(value(data.replace(&s, pattern, "").unwrap()), Data::from(vec!["abc"]));
    }

    #[test]
    fn test_float_and_offset() {
        let (s, _) = session();
        let data = Data::from(vec!["1.5kg", "x"]);
        let floats = value(data.float(&s).unwrap());
        assert_eq!(floats.items()[0], Item::Number(1.5));
        assert!(matches!(floats.items()[1], Item::Number(n) if n.is_nan()));

        let shifted = value(Data::new(vec![Item::from(1), text("v"), Item::Undefined]).offset(&s, 2).unwrap());
        assert_eq!(shifted.items()[0], Item::Number(3.0));
        assert_eq!(shifted.items()[1], text("v2"));
        assert!(matches!(shifted.items()[2], Item::Number(n) if n.is_nan()));
    }

    #[test]
    fn test_offset_rejects_bytes() {
        let (s, _) = session();
        let err = Data::new(vec![Item::Bytes(vec![1])]).offset(&s, 1).unwrap_err();
        assert!(matches!(err, PipelineError::UserOperation { op: "offset", .. }));
    }

    #[test]
    fn test_map_failure_is_user_operation_error() {
        let (s, _) = session();
        let number = Transform::builtin("number").unwrap();
        let err = Data::from(vec!["1", "two"]).map(&s, number).unwrap_err();
        assert_eq!(err.to_string(), "map: not a number: \"two\"");

        let upper = Transform::builtin("upper").unwrap();
        let ok = value(Data::from(vec!["a"]).transform(&s, upper).unwrap());
        assert_eq!(ok, Data::from(vec!["A"]));
    }

    #[test]
    fn test_each_wraps_items() {
        let (s, _) = session();
        let data = Data::new(vec![text("a"), Item::List(vec![text("b"), text("c")])]);
        let Container::Fanout(fanout) = data.each(&s).unwrap() else {
            panic!("expected fan-out");
        };
        let branches: Vec<_> = fanout
            .branches()
            .map(|b| match b {
                Branch::Value(d) => d.clone(),
                Branch::Deferred(_) => panic!("unexpected deferred branch"),
            })
            .collect();
        assert_eq!(branches, vec![Data::from(vec!["a"]), Data::from(vec!["b", "c"])]);
    }

    #[test]
    fn test_load_and_files_touch_session() {
        let (s, _) = session();
        let data = Data::from(vec!["x"]);
        data.load(&s).unwrap();
        assert_eq!(s.current(), data);
        assert_eq!(s.history_len(), 1);

        data.files(&s).unwrap();
        assert_eq!(s.files(), Some(data));
    }

    #[test]
    fn test_print_and_type_emit() {
        let (s, console) = session();
        let data = Data::from(vec!["a", "b"]);
        data.print(&s).unwrap();
        data.show(&s).unwrap();

        let lines = console.lines();
        assert_eq!(lines[0], "[ 'a', 'b' ]");
        assert_eq!(lines[1], format!("a{}b", s.config().separator));
    }

    #[test]
    fn test_write_without_files_is_synchronous_error() {
        let (s, _) = session();
        let err = Data::from(vec!["x"]).write(&s).unwrap_err();
        assert!(matches!(err, PipelineError::NoFilesRegistered));
    }

    #[test]
    fn test_write_cardinality_mismatch_is_synchronous() {
        // No runtime here: the check must fail before anything is spawned.
        let (s, _) = session();
        s.register_files(Data::from(vec!["a.txt", "b.txt"]));

        let err = Data::from(vec!["1", "2", "3"]).write(&s).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::CardinalityMismatch {
                registered: 2,
                items: 3
            }
        ));

        let err = Data::from(vec!["x"]).rename(&s).unwrap_err();
        assert!(matches!(err, PipelineError::CardinalityMismatch { .. }));
    }
}
