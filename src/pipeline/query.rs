//! Query builder
//!
//! A `Query` is an immutable chain of plan nodes rooted at a borrowed slice.
//! Every operator call returns a new `Query` sharing the upstream chain; no
//! node is mutated after construction and no user callback runs until a
//! terminal evaluator opens the chain.

use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{invalid_argument, BoxError, QueryError, Result};

use super::cursor::{
    drain, BoxCursor, MaterializeCursor, SelectCursor, SelectManyCursor, SliceCursor,
    WhereCursor, WindowCursor,
};
use super::execution_plan::ExecutionPlan;
use super::group::{Group, Grouping};
use super::ir::{PipeIR, Step};
use super::order::{sort_stable, SortKey};
use super::planner::Planner;
use super::window::Window;

/// One node of a built chain.
pub(crate) trait Plan<'a, T>: Send + Sync {
    /// Open a fresh cursor over this node. Called once per evaluation.
    fn open(&self) -> Result<BoxCursor<'a, T>>;

    /// Append this node's steps (upstream first) to `ir`.
    fn describe(&self, ir: &mut PipeIR);

    /// Upstream and window if this node is a collapsed Skip/Take run.
    fn as_window(&self) -> Option<(SharedPlan<'a, T>, Window)> {
        None
    }

    /// Upstream and keys if this node is an OrderBy.
    fn as_ordering(&self) -> Option<(SharedPlan<'a, T>, Vec<SortKey<'a, T>>)> {
        None
    }
}

pub(crate) type SharedPlan<'a, T> = Arc<dyn Plan<'a, T> + 'a>;

struct SourceNode<'a, S> {
    items: &'a [S],
}

impl<'a, S: Sync> Plan<'a, &'a S> for SourceNode<'a, S> {
    fn open(&self) -> Result<BoxCursor<'a, &'a S>> {
        Ok(Box::new(SliceCursor::new(self.items)))
    }

    fn describe(&self, ir: &mut PipeIR) {
        ir.push(Step::Source {
            len: self.items.len(),
        });
    }
}

struct SelectNode<'a, T, F> {
    upstream: SharedPlan<'a, T>,
    f: Arc<F>,
}

impl<'a, T: 'a, U, F> Plan<'a, U> for SelectNode<'a, T, F>
where
    F: Fn(T) -> Result<U> + Send + Sync + 'a,
{
    fn open(&self) -> Result<BoxCursor<'a, U>> {
        let upstream = self.upstream.open()?;
        Ok(Box::new(SelectCursor::new(upstream, Arc::clone(&self.f))))
    }

    fn describe(&self, ir: &mut PipeIR) {
        self.upstream.describe(ir);
        ir.push(Step::Select);
    }
}

struct WhereNode<'a, T, P> {
    upstream: SharedPlan<'a, T>,
    predicate: Arc<P>,
}

impl<'a, T: 'a, P> Plan<'a, T> for WhereNode<'a, T, P>
where
    P: Fn(&T) -> Result<bool> + Send + Sync + 'a,
{
    fn open(&self) -> Result<BoxCursor<'a, T>> {
        let upstream = self.upstream.open()?;
        Ok(Box::new(WhereCursor::new(upstream, Arc::clone(&self.predicate))))
    }

    fn describe(&self, ir: &mut PipeIR) {
        self.upstream.describe(ir);
        ir.push(Step::Where);
    }
}

struct WindowNode<'a, T> {
    upstream: SharedPlan<'a, T>,
    window: Window,
}

impl<'a, T: 'a> Plan<'a, T> for WindowNode<'a, T> {
    fn open(&self) -> Result<BoxCursor<'a, T>> {
        let upstream = self.upstream.open()?;
        Ok(Box::new(WindowCursor::new(upstream, self.window)))
    }

    fn describe(&self, ir: &mut PipeIR) {
        self.upstream.describe(ir);
        ir.push(Step::Window(self.window));
    }

    fn as_window(&self) -> Option<(SharedPlan<'a, T>, Window)> {
        Some((Arc::clone(&self.upstream), self.window))
    }
}

struct SelectManyNode<'a, T, I, F> {
    upstream: SharedPlan<'a, T>,
    f: Arc<F>,
    _out: PhantomData<fn() -> I>,
}

impl<'a, T: 'a, I, F> Plan<'a, I::Item> for SelectManyNode<'a, T, I, F>
where
    I: IntoIterator + 'a,
    I::IntoIter: 'a,
    F: Fn(T) -> I + Send + Sync + 'a,
{
    fn open(&self) -> Result<BoxCursor<'a, I::Item>> {
        let upstream = self.upstream.open()?;
        Ok(Box::new(SelectManyCursor::<'a, T, I, F>::new(
            upstream,
            Arc::clone(&self.f),
        )))
    }

    fn describe(&self, ir: &mut PipeIR) {
        self.upstream.describe(ir);
        ir.push(Step::SelectMany);
    }
}

struct GroupByNode<'a, T, K, V, KF, VF> {
    upstream: SharedPlan<'a, T>,
    key: Arc<KF>,
    value: Arc<VF>,
    _out: PhantomData<fn() -> (K, V)>,
}

impl<'a, T: 'a, K, V, KF, VF> Plan<'a, Group<K, V>> for GroupByNode<'a, T, K, V, KF, VF>
where
    K: Hash + Eq + 'a,
    V: 'a,
    KF: Fn(&T) -> K + Send + Sync + 'a,
    VF: Fn(T) -> V + Send + Sync + 'a,
{
    fn open(&self) -> Result<BoxCursor<'a, Group<K, V>>> {
        let upstream = self.upstream.open()?;
        let key = Arc::clone(&self.key);
        let value = Arc::clone(&self.value);

        let finish = move |mut cursor: BoxCursor<'a, T>| -> Result<Vec<Group<K, V>>> {
            let mut grouping = Grouping::new();
            while let Some(item) = cursor.next()? {
                let k = key(&item);
                grouping.push(k, value(item));
            }
            debug!(
                groups = grouping.len(),
                members = grouping.members(),
                "grouping materialized"
            );
            Ok(grouping.into_groups())
        };

        Ok(Box::new(MaterializeCursor::new(upstream, finish)))
    }

    fn describe(&self, ir: &mut PipeIR) {
        self.upstream.describe(ir);
        ir.push(Step::GroupBy);
    }
}

struct OrderByNode<'a, T> {
    upstream: SharedPlan<'a, T>,
    keys: Arc<[SortKey<'a, T>]>,
}

impl<'a, T: 'a> Plan<'a, T> for OrderByNode<'a, T> {
    fn open(&self) -> Result<BoxCursor<'a, T>> {
        let upstream = self.upstream.open()?;
        let keys = Arc::clone(&self.keys);

        let finish = move |mut cursor: BoxCursor<'a, T>| -> Result<Vec<T>> {
            let mut rows = drain(cursor.as_mut())?;
            sort_stable(&mut rows, &keys);
            debug!(rows = rows.len(), keys = keys.len(), "ordering materialized");
            Ok(rows)
        };

        Ok(Box::new(MaterializeCursor::new(upstream, finish)))
    }

    fn describe(&self, ir: &mut PipeIR) {
        self.upstream.describe(ir);
        ir.push(Step::OrderBy {
            directions: self.keys.iter().map(SortKey::direction).collect(),
        });
    }

    fn as_ordering(&self) -> Option<(SharedPlan<'a, T>, Vec<SortKey<'a, T>>)> {
        Some((Arc::clone(&self.upstream), self.keys.to_vec()))
    }
}

/// Lazily evaluated query over a borrowed sequence.
///
/// Cloning is cheap; clones share the whole chain. A built query is
/// `Send + Sync` and may be evaluated from several threads at once.
pub struct Query<'a, T> {
    pub(super) plan: SharedPlan<'a, T>,
}

impl<'a, S: Sync + 'a> Query<'a, &'a S> {
    /// Wrap a caller-owned slice. Nothing is copied.
    pub fn from_slice(items: &'a [S]) -> Self {
        Query::from_plan(SourceNode { items })
    }

    /// Project borrowed elements to owned copies.
    pub fn copied(&self) -> Query<'a, S>
    where
        S: Copy,
    {
        self.select(|item: &S| *item)
    }
}

impl<'a, S: Sync + 'a> From<&'a [S]> for Query<'a, &'a S> {
    fn from(items: &'a [S]) -> Self {
        Query::from_slice(items)
    }
}

impl<'a, T: 'a> Query<'a, T> {
    fn from_plan(plan: impl Plan<'a, T> + 'a) -> Self {
        Query {
            plan: Arc::new(plan),
        }
    }

    /// Append a Select stage.
    pub fn select<U, F>(&self, f: F) -> Query<'a, U>
    where
        U: 'a,
        F: Fn(T) -> U + Send + Sync + 'a,
    {
        self.try_select(move |item| Ok::<U, Infallible>(f(item)))
    }

    /// Append a Select stage whose transform may fail. The first error ends
    /// the evaluation and is returned from the terminal call.
    pub fn try_select<U, E, F>(&self, f: F) -> Query<'a, U>
    where
        U: 'a,
        E: Into<BoxError>,
        F: Fn(T) -> std::result::Result<U, E> + Send + Sync + 'a,
    {
        let f = move |item: T| f(item).map_err(QueryError::callback);
        Query::from_plan(SelectNode {
            upstream: Arc::clone(&self.plan),
            f: Arc::new(f),
        })
    }

    /// Append a Where stage.
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'a,
    {
        self.try_filter(move |item: &T| Ok::<bool, Infallible>(predicate(item)))
    }

    /// Append a Where stage whose predicate may fail.
    pub fn try_filter<E, P>(&self, predicate: P) -> Self
    where
        E: Into<BoxError>,
        P: Fn(&T) -> std::result::Result<bool, E> + Send + Sync + 'a,
    {
        let predicate = move |item: &T| predicate(item).map_err(QueryError::callback);
        Query::from_plan(WhereNode {
            upstream: Arc::clone(&self.plan),
            predicate: Arc::new(predicate),
        })
    }

    /// Append a Skip stage. Fails if `n` is negative.
    pub fn skip<N>(&self, n: N) -> Result<Self>
    where
        N: TryInto<usize> + fmt::Display + Copy,
    {
        let n = count_arg("skip", n)?;
        Ok(self.with_window(|window| window.skip(n)))
    }

    /// Append a Take stage. Fails if `n` is negative.
    pub fn take<N>(&self, n: N) -> Result<Self>
    where
        N: TryInto<usize> + fmt::Display + Copy,
    {
        let n = count_arg("take", n)?;
        Ok(self.with_window(|window| window.take(n)))
    }

    /// Narrow the trailing window, or open one if the chain does not end in
    /// a window.
    fn with_window(&self, narrow: impl FnOnce(Window) -> Window) -> Self {
        let (upstream, window) = match self.plan.as_window() {
            Some((upstream, window)) => (upstream, window),
            None => (Arc::clone(&self.plan), Window::UNBOUNDED),
        };
        let narrowed = narrow(window);
        trace!(from = %window, to = %narrowed, "collapsed skip/take");

        Query::from_plan(WindowNode {
            upstream,
            window: narrowed,
        })
    }

    /// Append a GroupBy stage collecting whole elements.
    pub fn group_by<K, KF>(&self, key: KF) -> Query<'a, Group<K, T>>
    where
        K: Hash + Eq + 'a,
        KF: Fn(&T) -> K + Send + Sync + 'a,
    {
        self.group_by_with(key, |item: T| item)
    }

    /// Append a GroupBy stage collecting `value(element)` per key.
    ///
    /// Everything appended afterwards runs over the groups, in the order
    /// each key was first seen.
    pub fn group_by_with<K, V, KF, VF>(&self, key: KF, value: VF) -> Query<'a, Group<K, V>>
    where
        K: Hash + Eq + 'a,
        V: 'a,
        KF: Fn(&T) -> K + Send + Sync + 'a,
        VF: Fn(T) -> V + Send + Sync + 'a,
    {
        Query::from_plan(GroupByNode {
            upstream: Arc::clone(&self.plan),
            key: Arc::new(key),
            value: Arc::new(value),
            _out: PhantomData,
        })
    }

    /// Append an OrderBy stage. Needs at least one key.
    pub fn order_by<I>(&self, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = SortKey<'a, T>>,
    {
        let keys: Vec<SortKey<'a, T>> = keys.into_iter().collect();
        if keys.is_empty() {
            return Err(invalid_argument!("order_by requires at least one sort key"));
        }
        Ok(self.ordered(Arc::clone(&self.plan), keys))
    }

    /// Add a lower-priority key to the OrderBy this query ends with.
    pub fn then_by(&self, key: SortKey<'a, T>) -> Result<Self> {
        let (upstream, mut keys) = self
            .plan
            .as_ordering()
            .ok_or_else(|| invalid_argument!("then_by must directly follow order_by"))?;
        keys.push(key);
        Ok(self.ordered(upstream, keys))
    }

    fn ordered(&self, upstream: SharedPlan<'a, T>, keys: Vec<SortKey<'a, T>>) -> Self {
        Query::from_plan(OrderByNode {
            upstream,
            keys: keys.into(),
        })
    }

    /// Append a SelectMany stage: each element expands to the items of `f(element)`.
    pub fn select_many<I, F>(&self, f: F) -> Query<'a, I::Item>
    where
        I: IntoIterator + 'a,
        I::IntoIter: 'a,
        I::Item: 'a,
        F: Fn(T) -> I + Send + Sync + 'a,
    {
        Query::from_plan(SelectManyNode {
            upstream: Arc::clone(&self.plan),
            f: Arc::new(f),
            _out: PhantomData,
        })
    }

    /// SelectMany over a selector pair: emits `first(x)` then `second(x)`.
    pub fn select_many_pair<U, A, B>(&self, first: A, second: B) -> Query<'a, U>
    where
        U: 'a,
        A: Fn(&T) -> U + Send + Sync + 'a,
        B: Fn(&T) -> U + Send + Sync + 'a,
    {
        self.select_many(move |item: T| [first(&item), second(&item)])
    }

    /// Linear step list for this chain.
    pub fn ir(&self) -> PipeIR {
        let mut ir = PipeIR::new();
        self.plan.describe(&mut ir);
        ir
    }

    /// Segment plan for this chain.
    pub fn explain(&self) -> ExecutionPlan {
        Planner::plan(&self.ir())
    }
}

impl<T> Clone for Query<'_, T> {
    fn clone(&self) -> Self {
        Query {
            plan: Arc::clone(&self.plan),
        }
    }
}

impl<'a, T: 'a> fmt::Debug for Query<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Query").field(&self.explain().to_string()).finish()
    }
}

fn count_arg<N>(op: &str, n: N) -> Result<usize>
where
    N: TryInto<usize> + fmt::Display + Copy,
{
    n.try_into()
        .map_err(|_| invalid_argument!("{op} count must be a non-negative integer, got {n}"))
}
