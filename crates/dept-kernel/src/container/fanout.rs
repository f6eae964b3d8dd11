//! `Fanout`: many independent pipelines driven by one chain.

use dept_types::Item;
use futures::future::try_join_all;

use super::{Container, Data, Deferred};
use crate::error::PipelineResult;
use crate::ops::{Op, Pipeline};
use crate::session::Session;

/// One element of a fan-out.
#[derive(Debug, Clone)]
pub enum Branch {
    Value(Data),
    Deferred(Deferred),
}

impl Branch {
    /// Wait for this branch's value.
    pub async fn resolve(&self) -> PipelineResult<Data> {
        match self {
            Branch::Value(data) => Ok(data.clone()),
            Branch::Deferred(deferred) => deferred.resolve().await,
        }
    }
}

impl From<Data> for Branch {
    fn from(data: Data) -> Self {
        Branch::Value(data)
    }
}

impl From<Deferred> for Branch {
    fn from(deferred: Deferred) -> Self {
        Branch::Deferred(deferred)
    }
}

/// The kind of item a branch was made from, which decides what it
/// contributes when the fan-out is joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    /// A non-list item wrapped as a singleton. Rejoins as the lone item
    /// when the branch still holds exactly one.
    #[default]
    Item,
    /// A list item. Always rejoins as a list.
    List,
}

#[derive(Debug, Clone)]
struct Lane {
    origin: Origin,
    branch: Branch,
}

impl Lane {
    /// Apply `op` to this lane, appending the resulting lane (or lanes, if
    /// the operation fans out again) to `out`.
    fn apply_into(&self, op: Op, session: &Session, out: &mut Vec<Lane>) -> PipelineResult<()> {
        let origin = self.origin;
        match &self.branch {
            Branch::Value(data) => match data.apply(op, session)? {
                Container::Value(data) => out.push(Lane { origin, branch: Branch::Value(data) }),
                Container::Deferred(deferred) => {
                    out.push(Lane { origin, branch: Branch::Deferred(deferred) })
                }
                Container::Fanout(nested) => out.extend(nested.lanes),
            },
            Branch::Deferred(deferred) => out.push(Lane {
                origin,
                branch: Branch::Deferred(deferred.apply(op, session)),
            }),
        }
        Ok(())
    }
}

/// An ordered sequence of branches.
#[derive(Debug, Clone, Default)]
pub struct Fanout {
    lanes: Vec<Lane>,
}

impl Fanout {
    /// A fan-out whose branches all rejoin as single items.
    pub fn new(branches: Vec<Branch>) -> Self {
        branches.into_iter().collect()
    }

    pub fn branches(&self) -> impl ExactSizeIterator<Item = &Branch> {
        self.lanes.iter().map(|lane| &lane.branch)
    }

    pub fn origins(&self) -> impl ExactSizeIterator<Item = Origin> + '_ {
        self.lanes.iter().map(|lane| lane.origin)
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Collapse back into a single container.
    ///
    /// When every branch is already a value the result is a value container.
    /// Otherwise all branches are awaited concurrently; the first rejection
    /// rejects the whole join. Output order is branch order, not completion
    /// order.
    pub fn end(&self) -> Container {
        let values: Option<Vec<(Origin, &Data)>> = self
            .lanes
            .iter()
            .map(|lane| match &lane.branch {
                Branch::Value(data) => Some((lane.origin, data)),
                Branch::Deferred(_) => None,
            })
            .collect();

        if let Some(values) = values {
            return Container::Value(
                values
                    .into_iter()
                    .map(|(origin, data)| payload(origin, data.clone()))
                    .collect(),
            );
        }

        let lanes = self.lanes.clone();
        tracing::debug!(branches = lanes.len(), "joining fan-out");
        Container::Deferred(Deferred::spawn(async move {
            let settled = try_join_all(lanes.iter().map(|lane| lane.branch.resolve())).await?;
            Ok(Container::Value(
                lanes
                    .iter()
                    .zip(settled)
                    .map(|(lane, data)| payload(lane.origin, data))
                    .collect(),
            ))
        }))
    }
}

/// What a branch contributes to the joined container.
fn payload(origin: Origin, data: Data) -> Item {
    match origin {
        Origin::List => Item::List(data.into_items()),
        Origin::Item => match <[Item; 1]>::try_from(data.into_items()) {
            Ok([item]) => item,
            Err(items) => Item::List(items),
        },
    }
}

impl Pipeline for Fanout {
    type Output = PipelineResult<Fanout>;

    fn apply(&self, op: Op, session: &Session) -> Self::Output {
        // No branch may start I/O while another would still refuse the op.
        for lane in &self.lanes {
            if let Branch::Value(data) = &lane.branch {
                data.precheck(&op, session)?;
            }
        }
        let mut lanes = Vec::with_capacity(self.lanes.len());
        for lane in &self.lanes {
            lane.apply_into(op.clone(), session, &mut lanes)?;
        }
        Ok(Fanout { lanes })
    }
}

impl FromIterator<Branch> for Fanout {
    fn from_iter<I: IntoIterator<Item = Branch>>(iter: I) -> Self {
        iter.into_iter().map(|branch| (Origin::Item, branch)).collect()
    }
}

impl FromIterator<(Origin, Branch)> for Fanout {
    fn from_iter<I: IntoIterator<Item = (Origin, Branch)>>(iter: I) -> Self {
        Fanout {
            lanes: iter
                .into_iter()
                .map(|(origin, branch)| Lane { origin, branch })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::error::PipelineError;
    use crate::session::BufferConsole;
    use std::sync::Arc;
    use std::time::Duration;

    fn session() -> Session {
        Session::new(SessionConfig::memory(), Arc::new(BufferConsole::new()))
    }

    fn fanout(container: Container) -> Fanout {
        match container {
            Container::Fanout(fanout) => fanout,
            other => panic!("expected fan-out, got {}", other.kind()),
        }
    }

    fn delayed(ms: u64, data: Data) -> Branch {
        Branch::Deferred(Deferred::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(Container::Value(data))
        }))
    }

    #[test]
    fn test_each_end_is_identity() {
        let s = session();
        for items in [vec![], vec!["a"], vec!["a", "b", "c"]] {
            let original = Data::from(items);
            let joined = fanout(original.each(&s).unwrap()).end();
            assert_eq!(joined.as_value(), Some(&original));
        }
    }

    #[test]
    fn test_each_end_keeps_short_lists() {
        let s = session();
        let original = Data::new(vec![
            Item::List(vec![Item::from("x")]),
            Item::List(vec![]),
            Item::from("y"),
            Item::List(vec![Item::from(1), Item::from(2)]),
        ]);
        let fan = fanout(original.each(&s).unwrap());
        assert_eq!(
            fan.origins().collect::<Vec<_>>(),
            vec![Origin::List, Origin::List, Origin::Item, Origin::List]
        );
        assert_eq!(fan.end().as_value(), Some(&original));
    }

    #[test]
    fn test_split_each_end_round_trip() {
        let s = session();
        let split = Data::from(vec!["a,b", "c"]).split(&s, ",").unwrap();
        let original = split.as_value().unwrap().clone();
        let joined = fanout(split.each(&s).unwrap()).end();
        assert_eq!(joined.as_value(), Some(&original));
    }

    #[tokio::test]
    async fn test_deferred_list_branch_keeps_list() {
        let fan: Fanout = [
            (Origin::List, delayed(5, Data::from(vec!["x"]))),
            (Origin::Item, delayed(1, Data::from(vec!["y"]))),
        ]
        .into_iter()
        .collect();
        let Container::Deferred(joined) = fan.end() else {
            panic!("expected deferred join");
        };
        assert_eq!(
            joined.resolve().await.unwrap(),
            Data::new(vec![Item::List(vec![Item::from("x")]), Item::from("y")])
        );
    }

    #[test]
    fn test_cardinality_checked_across_branches_first() {
        let s = session();
        s.register_files(Data::from(vec!["/out.txt"]));
        let fan = Fanout::new(vec![
            Branch::Value(Data::from(vec!["one"])),
            Branch::Value(Data::from(vec!["x", "y"])),
        ]);
        let err = fan.write(&s).unwrap_err();
        assert_eq!(err.to_string(), "incorrect number of files registered (1 != 2)");
    }

    #[test]
    fn test_broadcast_arithmetic() {
        let s = session();
        let joined = fanout(Data::from(vec![1, 2, 3]).each(&s).unwrap())
            .offset(&s, 10)
            .unwrap()
            .end();
        assert_eq!(joined.as_value(), Some(&Data::from(vec![11, 12, 13])));
    }

    #[test]
    fn test_multi_item_branch_contributes_list() {
        let s = session();
        let joined = fanout(Data::from(vec!["a,b", "c"]).each(&s).unwrap())
            .split(&s, ",")
            .unwrap()
            .flatten(&s)
            .unwrap()
            .end();
        let expected = Data::new(vec![
            Item::List(vec![Item::from("a"), Item::from("b")]),
            Item::from("c"),
        ]);
        assert_eq!(joined.as_value(), Some(&expected));
    }

    #[test]
    fn test_nested_each_splices_branches() {
        let s = session();
        let outer = Data::new(vec![Item::List(vec![Item::from(1), Item::from(2)]), Item::from(3)]);
        let nested = fanout(outer.each(&s).unwrap()).each(&s).unwrap();
        assert_eq!(nested.len(), 3);
        assert_eq!(nested.end().as_value(), Some(&Data::from(vec![1, 2, 3])));
    }

    #[test]
    fn test_synchronous_branch_error_propagates() {
        let s = session();
        let err = fanout(Data::from(vec!["x"]).each(&s).unwrap())
            .write(&s)
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoFilesRegistered));
    }

    #[tokio::test]
    async fn test_join_keeps_branch_order() {
        let fanout: Fanout = [300, 10, 100]
            .into_iter()
            .enumerate()
            .map(|(i, ms)| delayed(ms, Data::from(vec![i as i64])))
            .collect();

        let Container::Deferred(joined) = fanout.end() else {
            panic!("expected deferred join");
        };
        assert_eq!(joined.resolve().await.unwrap(), Data::from(vec![0, 1, 2]));
    }

    #[tokio::test]
    async fn test_join_fails_fast() {
        let fanout = Fanout::new(vec![
            delayed(50, Data::from(vec!["a"])),
            Branch::Deferred(Deferred::failed(PipelineError::user("map", "bad item"))),
            delayed(50, Data::from(vec!["c"])),
        ]);
        let Container::Deferred(joined) = fanout.end() else {
            panic!("expected deferred join");
        };
        let err = joined.resolve().await.unwrap_err();
        assert_eq!(err.to_string(), "map: bad item");
    }

    #[tokio::test]
    async fn test_mixed_branches_lift_per_branch() {
        let s = session();
        let fanout = Fanout::new(vec![
            Branch::Value(Data::from(vec!["a"])),
            delayed(5, Data::from(vec!["b"])),
        ])
        .transform(&s, crate::ops::Transform::builtin("upper").unwrap())
        .unwrap();

        let branches: Vec<_> = fanout.branches().collect();
        assert!(matches!(branches[0], Branch::Value(_)));
        assert!(matches!(branches[1], Branch::Deferred(_)));

        let Container::Deferred(joined) = fanout.end() else {
            panic!("expected deferred join");
        };
        assert_eq!(joined.resolve().await.unwrap(), Data::from(vec!["A", "B"]));
    }
}
