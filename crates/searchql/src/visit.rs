//! Rewriting passes over owned IR
//!
//! Implement [`Visitor`] and override the `visit_*` methods for the kinds you
//! care about; the defaults rebuild each node from its transformed children.
//! A `visit_*` method may return a different kind than it receives as long as
//! the parent slot accepts it (any query expression may replace another).

use crate::ir::{
    AndExpr, BoolLiteral, FieldRef, IndexRef, Limit, Node, NodeKind, NotExpr, NumericCompareExpr,
    NumericLiteral, OrExpr, QueryExpr, SearchStmt, SelectExpr, SortBy, StringLiteral,
    TagContainExpr,
};

pub trait Visitor {
    fn transform(&mut self, node: Node) -> Node {
        match node {
            Node::SearchStmt(n) => self.visit_search_stmt(n),
            Node::SelectExpr(n) => self.visit_select_expr(n),
            Node::IndexRef(n) => self.visit_index_ref(n),
            Node::Limit(n) => self.visit_limit(n),
            Node::SortBy(n) => self.visit_sort_by(n),
            Node::AndExpr(n) => self.visit_and_expr(n),
            Node::OrExpr(n) => self.visit_or_expr(n),
            Node::NotExpr(n) => self.visit_not_expr(n),
            Node::NumericCompareExpr(n) => self.visit_numeric_compare_expr(n),
            Node::NumericLiteral(n) => self.visit_numeric_literal(n),
            Node::FieldRef(n) => self.visit_field_ref(n),
            Node::TagContainExpr(n) => self.visit_tag_contain_expr(n),
            Node::StringLiteral(n) => self.visit_string_literal(n),
            Node::BoolLiteral(n) => self.visit_bool_literal(n),
        }
    }

    /// Transform a child whose slot only accepts `T`
    ///
    /// # Panics
    ///
    /// Panics if a `visit_*` override returned a kind the slot can't hold.
    fn transform_as<T: NodeKind>(&mut self, node: T) -> T {
        self.transform(node.into()).must_cast()
    }

    fn visit_search_stmt(&mut self, stmt: SearchStmt) -> Node {
        let SearchStmt {
            select,
            index,
            query,
            limit,
            sort_by,
        } = stmt;
        let index = self.transform_as(index);
        let select = self.transform_as(select);
        let query = query.map(|q| self.transform_as(q));
        let sort_by = sort_by.map(|s| self.transform_as(s));
        let limit = limit.map(|l| self.transform_as(l));
        Node::SearchStmt(SearchStmt {
            select,
            index,
            query,
            limit,
            sort_by,
        })
    }

    fn visit_select_expr(&mut self, select: SelectExpr) -> Node {
        let fields = select
            .fields
            .into_iter()
            .map(|f| self.transform_as(f))
            .collect();
        Node::SelectExpr(SelectExpr::new(fields))
    }

    fn visit_index_ref(&mut self, index: IndexRef) -> Node {
        Node::IndexRef(index)
    }

    fn visit_field_ref(&mut self, field: FieldRef) -> Node {
        Node::FieldRef(field)
    }

    fn visit_bool_literal(&mut self, lit: BoolLiteral) -> Node {
        Node::BoolLiteral(lit)
    }

    fn visit_string_literal(&mut self, lit: StringLiteral) -> Node {
        Node::StringLiteral(lit)
    }

    fn visit_numeric_literal(&mut self, lit: NumericLiteral) -> Node {
        Node::NumericLiteral(lit)
    }

    fn visit_numeric_compare_expr(&mut self, expr: NumericCompareExpr) -> Node {
        let field = self.transform_as(expr.field);
        let num = self.transform_as(expr.num);
        Node::NumericCompareExpr(NumericCompareExpr::new(expr.op, field, num))
    }

    fn visit_tag_contain_expr(&mut self, expr: TagContainExpr) -> Node {
        let field = self.transform_as(expr.field);
        let tag = self.transform_as(expr.tag);
        Node::TagContainExpr(TagContainExpr::new(field, tag))
    }

    fn visit_and_expr(&mut self, expr: AndExpr) -> Node {
        let inners = expr
            .into_inners()
            .into_iter()
            .map(|q| self.transform_as::<QueryExpr>(q))
            .collect();
        Node::AndExpr(AndExpr::new(inners))
    }

    fn visit_or_expr(&mut self, expr: OrExpr) -> Node {
        let inners = expr
            .into_inners()
            .into_iter()
            .map(|q| self.transform_as::<QueryExpr>(q))
            .collect();
        Node::OrExpr(OrExpr::new(inners))
    }

    fn visit_not_expr(&mut self, expr: NotExpr) -> Node {
        let inner = self.transform_as::<QueryExpr>(*expr.inner);
        Node::NotExpr(NotExpr::new(inner))
    }

    fn visit_limit(&mut self, limit: Limit) -> Node {
        Node::Limit(limit)
    }

    fn visit_sort_by(&mut self, sort_by: SortBy) -> Node {
        let field = self.transform_as(sort_by.field);
        Node::SortBy(SortBy::new(sort_by.order, field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::CompareOp;
    use crate::parse::{parse_query, parse_statement};

    /// Renames fields everywhere they appear
    struct Rename<'a> {
        from: &'a str,
        to: &'a str,
    }

    impl Visitor for Rename<'_> {
        fn visit_field_ref(&mut self, field: FieldRef) -> Node {
            if field.name == self.from {
                Node::FieldRef(FieldRef::new(self.to))
            } else {
                Node::FieldRef(field)
            }
        }
    }

    /// Replaces every comparison on one field with `true`
    struct DropField(&'static str);

    impl Visitor for DropField {
        fn visit_numeric_compare_expr(&mut self, expr: NumericCompareExpr) -> Node {
            if expr.field.name == self.0 {
                Node::BoolLiteral(BoolLiteral::new(true))
            } else {
                Node::NumericCompareExpr(expr)
            }
        }
    }

    /// Records visit order of leaves
    #[derive(Default)]
    struct Trace(Vec<String>);

    impl Visitor for Trace {
        fn visit_field_ref(&mut self, field: FieldRef) -> Node {
            self.0.push(field.name.clone());
            Node::FieldRef(field)
        }

        fn visit_index_ref(&mut self, index: IndexRef) -> Node {
            self.0.push(format!("index:{}", index.name));
            Node::IndexRef(index)
        }
    }

    /// Breaks the tree shape: turns field references into literals
    struct Broken;

    impl Visitor for Broken {
        fn visit_field_ref(&mut self, _field: FieldRef) -> Node {
            Node::BoolLiteral(BoolLiteral::new(false))
        }
    }

    #[test]
    fn default_pass_is_identity() {
        struct Noop;
        impl Visitor for Noop {}

        let stmt = parse_statement(
            r#"select a, b from idx where (or a >= 1, not b hastag "x") sortby a, desc limit 0, 5"#,
        )
        .unwrap();
        let out = Noop.transform(stmt.clone().into());
        assert_eq!(out, Node::SearchStmt(stmt));
    }

    #[test]
    fn rename_field() {
        let query = parse_query("@a:[1 2] | -@b:{x} @a:{y}").unwrap();
        let out = Rename { from: "a", to: "z" }.transform_as(query);
        assert_eq!(
            out.to_string(),
            r#"(or (and z >= 1, z <= 2), (and not b hastag "x", z hastag "y"))"#
        );
    }

    #[test]
    fn replace_kind_inside_query() {
        let query = parse_query("@a:[1 inf] @b:[(2 3]").unwrap();
        let out = DropField("a").transform_as(query);
        assert_eq!(out.to_string(), "(and true, (and b > 2, b <= 3))");

        let out = DropField("b").transform_as(QueryExpr::compare("b", CompareOp::Eq, 1.0));
        assert_eq!(out, QueryExpr::truth());
    }

    #[test]
    fn statement_traversal_order() {
        let stmt =
            parse_statement("select s from idx where q = 1 sortby o, asc limit 0, 1").unwrap();
        let mut trace = Trace::default();
        trace.transform(stmt.into());
        assert_eq!(trace.0, ["index:idx", "s", "q", "o"]);
    }

    #[test]
    #[should_panic(expected = "expected FieldRef, found BoolLiteral")]
    fn wrong_kind_in_slot_is_a_bug() {
        let query = parse_query("@a:{x}").unwrap();
        Broken.transform_as(query);
    }
}
