//! # Tree Walking
//!
//! [`Visitor`] has one method per node kind, all defaulting to no-ops, so an
//! implementation only overrides the kinds it cares about. [`walk`] calls the
//! matching method for a node, then descends into its children between
//! [`Visitor::enter`] and [`Visitor::leave`].
//!
//! [`TreePrinter`] is the visitor behind `silas tree`; it prints one line
//! per node, indented by depth.

use std::fmt::Write as _;

use crate::tree::{Block, EntryContent, Inline, Link, List, ListEntry, Node, Paragraph, Section};

pub trait Visitor {
    fn visit_section(&mut self, _section: &Section) {}
    fn visit_paragraph(&mut self, _paragraph: &Paragraph) {}
    fn visit_block(&mut self, _block: &Block) {}
    fn visit_list(&mut self, _list: &List) {}
    fn visit_list_entry(&mut self, _entry: &ListEntry) {}
    fn visit_text(&mut self, _text: &str) {}
    fn visit_bold(&mut self, _text: &str) {}
    fn visit_italic(&mut self, _text: &str) {}
    fn visit_link(&mut self, _link: &Link) {}

    /// Called before the children of the node just visited.
    fn enter(&mut self) {}
    /// Called after the children of the node just visited.
    fn leave(&mut self) {}
}

/// Walk every node in `nodes` depth first.
pub fn walk<V: Visitor + ?Sized>(nodes: &[Node], visitor: &mut V) {
    for node in nodes {
        node.accept(visitor);
    }
}

impl Node {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Node::Section(section) => {
                visitor.visit_section(section);
                visitor.enter();
                walk(&section.children, visitor);
                visitor.leave();
            }
            Node::Paragraph(paragraph) => {
                visitor.visit_paragraph(paragraph);
                walk_inlines(&paragraph.content, visitor);
            }
            Node::Block(block) => {
                visitor.visit_block(block);
                match block {
                    Block::Comment { content } => walk_inlines(content, visitor),
                    Block::Quote { content, quotee } => {
                        walk_inlines(content, visitor);
                        if let Some(quotee) = quotee {
                            walk_inlines(quotee, visitor);
                        }
                    }
                    Block::Code { .. } => {}
                }
            }
            Node::List(list) => list.accept(visitor),
        }
    }
}

impl List {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_list(self);
        visitor.enter();
        for entry in &self.entries {
            visitor.visit_list_entry(entry);
            visitor.enter();
            for part in &entry.content {
                match part {
                    EntryContent::Text(runs) => {
                        for inline in runs {
                            inline.accept(visitor);
                        }
                    }
                    EntryContent::List(list) => list.accept(visitor),
                }
            }
            visitor.leave();
        }
        visitor.leave();
    }
}

impl Inline {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Inline::Text(text) => visitor.visit_text(text),
            Inline::Bold(text) => visitor.visit_bold(text),
            Inline::Italic(text) => visitor.visit_italic(text),
            Inline::Link(link) => visitor.visit_link(link),
        }
    }
}

fn walk_inlines<V: Visitor + ?Sized>(runs: &[Inline], visitor: &mut V) {
    if runs.is_empty() {
        return;
    }
    visitor.enter();
    for inline in runs {
        inline.accept(visitor);
    }
    visitor.leave();
}

/// Prints an indented outline of a document.
#[derive(Debug, Default)]
pub struct TreePrinter {
    depth: usize,
    output: String,
}

impl TreePrinter {
    pub fn print(nodes: &[Node]) -> String {
        let mut printer = TreePrinter::default();
        walk(nodes, &mut printer);
        printer.finish()
    }

    pub fn finish(self) -> String {
        self.output.trim_end().to_string()
    }

    fn line(&mut self, text: std::fmt::Arguments<'_>) {
        let _ = writeln!(self.output, "{}{}", "  ".repeat(self.depth), text);
    }
}

impl Visitor for TreePrinter {
    fn visit_section(&mut self, section: &Section) {
        self.line(format_args!(
            "Section[{}] {:?} #{}",
            section.level, section.title, section.id
        ));
    }

    fn visit_paragraph(&mut self, _paragraph: &Paragraph) {
        self.line(format_args!("Paragraph"));
    }

    fn visit_block(&mut self, block: &Block) {
        match block {
            Block::Code { language, lines } => self.line(format_args!(
                "Block[SRC {}] {} lines",
                language.as_deref().unwrap_or("-"),
                lines.len()
            )),
            other => self.line(format_args!("Block[{}]", other.name())),
        }
    }

    fn visit_list(&mut self, list: &List) {
        self.line(format_args!("List[{:?}]", list.style));
    }

    fn visit_list_entry(&mut self, _entry: &ListEntry) {
        self.line(format_args!("Entry"));
    }

    fn visit_text(&mut self, text: &str) {
        self.line(format_args!("Text {text:?}"));
    }

    fn visit_bold(&mut self, text: &str) {
        self.line(format_args!("Bold {text:?}"));
    }

    fn visit_italic(&mut self, text: &str) {
        self.line(format_args!("Italic {text:?}"));
    }

    fn visit_link(&mut self, link: &Link) {
        match &link.description {
            Some(description) => self.line(format_args!("Link {:?} {description:?}", link.target)),
            None => self.line(format_args!("Link {:?}", link.target)),
        }
    }

    fn enter(&mut self) {
        self.depth += 1;
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
