//! Graphviz export.

use crate::graph::{BasicBlock, BasicBlockKind, ControlFlowGraph};
use sable_printer::Printer;
use std::io::{self, Write};

impl ControlFlowGraph<'_> {
    /// Write the graph as a Graphviz `digraph` named after the method.
    pub fn write_dot<W: Write + ?Sized>(&self, name: &str, writer: &mut W) -> io::Result<()> {
        let mut printer = Printer::new();
        writeln!(writer, "digraph \"{}\" {{", escape(name))?;
        for block in &self.blocks {
            writeln!(
                writer,
                "    {} [label = \"{}\", shape = box]",
                block.id,
                block_label(&mut printer, block)
            )?;
        }
        for edge in &self.edges {
            match edge.condition {
                Some((condition, value)) => {
                    let text = printer.print_expression(condition);
                    let text = if value { text } else { format!("!({})", text) };
                    writeln!(writer, "    {} -> {} [label = \"{}\"]", edge.from, edge.to, escape(&text))?;
                }
                None => writeln!(writer, "    {} -> {}", edge.from, edge.to)?,
            }
        }
        writeln!(writer, "}}")
    }
}

fn block_label(printer: &mut Printer, block: &BasicBlock<'_>) -> String {
    match block.kind {
        BasicBlockKind::Start => "<Start>".to_string(),
        BasicBlockKind::End => "<End>".to_string(),
        BasicBlockKind::Body => block
            .statements
            .iter()
            .map(|s| escape(printer.print_statement(s).trim()) + "\\l")
            .collect(),
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\l")
}

#[cfg(test)]
mod tests {
    use crate::ControlFlowGraph;
    use pretty_assertions::assert_eq;
    use sable_bound::*;
    use sable_core::text::TextSpan;

    #[test]
    fn test_write_dot() {
        let flag = VariableSymbol::parameter("flag", TypeSymbol::Bool);
        let end = LabelSymbol::new("Label1");
        let body = BoundStatement::Block {
            statements: vec![
                BoundStatement::ConditionalGoto {
                    label: end.clone(),
                    condition: BoundExpression::Variable {
                        span: TextSpan::new(0, 0),
                        variable: flag,
                    },
                    jump_if_true: true,
                },
                BoundStatement::Return { expression: None },
                BoundStatement::Label { label: end },
                BoundStatement::Return { expression: None },
            ],
        };
        let graph = ControlFlowGraph::create(&body);

        let expected = r#"digraph "Main" {
    N0 [label = "<Start>", shape = box]
    N1 [label = "goto Label1 if flag;\l", shape = box]
    N2 [label = "return;\l", shape = box]
    N3 [label = "Label1:\lreturn;\l", shape = box]
    N4 [label = "<End>", shape = box]
    N0 -> N1
    N1 -> N3 [label = "flag"]
    N1 -> N2 [label = "!(flag)"]
    N2 -> N4
    N3 -> N4
}
"#;
        let mut buffer = Vec::new();
        graph.write_dot("Main", &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), expected);
    }
}
