//! Behavior-tree runtime
//!
//! A tree is a static composition of leaf values under two combinators:
//!
//! | Node        | Semantics                                                   |
//! |-------------|-------------------------------------------------------------|
//! | `Sequence`  | AND: evaluates children left-to-right, stops on first       |
//! |             | non-success and returns it                                  |
//! | `Fallback`  | OR: evaluates children left-to-right, stops on first        |
//! |             | non-fail and returns it                                     |
//! | `Condition` | Pure predicate over the context, Success/Fail               |
//! | `Action`    | Side-effecting step, returns its own status                 |
//!
//! Child order is fixed when the tree is built and never reordered at
//! runtime; all branching lives in predicate leaves. Effects applied by
//! earlier children of a failing sequence stay applied - there is no
//! rollback.
//!
//! Leaves are closed enums per agent kind rather than boxed trait
//! objects, so a whole topology is plain data that can be built once
//! and walked every tick for every agent of that kind.

/// Status yielded by one evaluation of a node
///
/// `Running` is reserved for actions that span multiple ticks; the
/// combinators propagate it, but no current leaf returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Fail,
    Running,
}

/// A pure predicate leaf; the shared reference keeps it side-effect free
pub trait Condition<Ctx> {
    fn check(&self, ctx: &Ctx) -> bool;
}

/// A side-effecting leaf
pub trait Action<Ctx> {
    fn apply(&self, ctx: &mut Ctx) -> Status;
}

/// A node in a behavior tree, generic over the agent's leaf enums
#[derive(Debug, Clone)]
pub enum Node<C, A> {
    Condition(C),
    Action(A),
    Sequence(Vec<Node<C, A>>),
    Fallback(Vec<Node<C, A>>),
}

impl<C, A> Node<C, A> {
    pub fn sequence(children: Vec<Node<C, A>>) -> Self {
        Node::Sequence(children)
    }

    pub fn fallback(children: Vec<Node<C, A>>) -> Self {
        Node::Fallback(children)
    }

    /// Evaluate this node against `ctx`, recursing through composites
    pub fn evaluate<Ctx>(&self, ctx: &mut Ctx) -> Status
    where
        C: Condition<Ctx>,
        A: Action<Ctx>,
    {
        match self {
            Node::Condition(leaf) => {
                if leaf.check(ctx) {
                    Status::Success
                } else {
                    Status::Fail
                }
            }
            Node::Action(leaf) => leaf.apply(ctx),
            Node::Sequence(children) => {
                for child in children {
                    match child.evaluate(ctx) {
                        Status::Success => continue,
                        other => return other,
                    }
                }
                Status::Success
            }
            Node::Fallback(children) => {
                for child in children {
                    match child.evaluate(ctx) {
                        Status::Fail => continue,
                        other => return other,
                    }
                }
                Status::Fail
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test context recording the order leaves fired in
    struct Trace {
        log: Vec<&'static str>,
    }

    enum TestCondition {
        True(&'static str),
        False(&'static str),
    }

    impl Condition<Trace> for TestCondition {
        fn check(&self, _ctx: &Trace) -> bool {
            matches!(self, TestCondition::True(_))
        }
    }

    enum TestAction {
        Succeed(&'static str),
        Fail(&'static str),
        Run(&'static str),
    }

    impl Action<Trace> for TestAction {
        fn apply(&self, ctx: &mut Trace) -> Status {
            match self {
                TestAction::Succeed(name) => {
                    ctx.log.push(name);
                    Status::Success
                }
                TestAction::Fail(name) => {
                    ctx.log.push(name);
                    Status::Fail
                }
                TestAction::Run(name) => {
                    ctx.log.push(name);
                    Status::Running
                }
            }
        }
    }

    type TestNode = Node<TestCondition, TestAction>;

    #[test]
    fn test_sequence_short_circuits_on_fail() {
        let tree = TestNode::sequence(vec![
            Node::Action(TestAction::Succeed("a")),
            Node::Action(TestAction::Fail("b")),
            Node::Action(TestAction::Succeed("c")),
        ]);
        let mut ctx = Trace { log: vec![] };
        assert_eq!(tree.evaluate(&mut ctx), Status::Fail);
        assert_eq!(ctx.log, vec!["a", "b"]);
    }

    #[test]
    fn test_sequence_all_success() {
        let tree = TestNode::sequence(vec![
            Node::Action(TestAction::Succeed("a")),
            Node::Condition(TestCondition::True("t")),
            Node::Action(TestAction::Succeed("b")),
        ]);
        let mut ctx = Trace { log: vec![] };
        assert_eq!(tree.evaluate(&mut ctx), Status::Success);
        assert_eq!(ctx.log, vec!["a", "b"]);
    }

    #[test]
    fn test_fallback_short_circuits_on_success() {
        let tree = TestNode::fallback(vec![
            Node::Action(TestAction::Fail("a")),
            Node::Action(TestAction::Succeed("b")),
            Node::Action(TestAction::Succeed("c")),
        ]);
        let mut ctx = Trace { log: vec![] };
        assert_eq!(tree.evaluate(&mut ctx), Status::Success);
        assert_eq!(ctx.log, vec!["a", "b"]);
    }

    #[test]
    fn test_fallback_all_fail() {
        let tree = TestNode::fallback(vec![
            Node::Condition(TestCondition::False("f")),
            Node::Action(TestAction::Fail("a")),
        ]);
        let mut ctx = Trace { log: vec![] };
        assert_eq!(tree.evaluate(&mut ctx), Status::Fail);
        assert_eq!(ctx.log, vec!["a"]);
    }

    #[test]
    fn test_running_propagates_through_composites() {
        let tree = TestNode::sequence(vec![
            Node::Action(TestAction::Succeed("a")),
            Node::Action(TestAction::Run("r")),
            Node::Action(TestAction::Succeed("b")),
        ]);
        let mut ctx = Trace { log: vec![] };
        assert_eq!(tree.evaluate(&mut ctx), Status::Running);
        assert_eq!(ctx.log, vec!["a", "r"]);

        let tree = TestNode::fallback(vec![
            Node::Action(TestAction::Fail("a")),
            Node::Action(TestAction::Run("r")),
            Node::Action(TestAction::Succeed("b")),
        ]);
        let mut ctx = Trace { log: vec![] };
        assert_eq!(tree.evaluate(&mut ctx), Status::Running);
        assert_eq!(ctx.log, vec!["a", "r"]);
    }

    #[test]
    fn test_nested_composition() {
        // fallback(seq(fail), seq(true, ok)) picks the second branch
        let tree = TestNode::fallback(vec![
            TestNode::sequence(vec![
                Node::Condition(TestCondition::False("guard")),
                Node::Action(TestAction::Succeed("skipped")),
            ]),
            TestNode::sequence(vec![
                Node::Condition(TestCondition::True("guard")),
                Node::Action(TestAction::Succeed("taken")),
            ]),
        ]);
        let mut ctx = Trace { log: vec![] };
        assert_eq!(tree.evaluate(&mut ctx), Status::Success);
        assert_eq!(ctx.log, vec!["taken"]);
    }
}
