//! Mark nesting for inline spans.
//!
//! A mark that covers several consecutive spans opens once around all of them
//! instead of once per span. Marks with longer runs sit further out, so
//! `[strong, em] [strong]` becomes `<strong><em>a</em>b</strong>`.

use std::cmp::Reverse;

use crate::model::Span;

/// Decorators in the order they nest when run lengths tie.
pub(crate) const DECORATORS: &[&str] = &["strong", "em", "code", "underline", "strike-through"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MarkNode<'a> {
    Text(&'a str),
    Marked {
        mark: &'a str,
        children: Vec<MarkNode<'a>>,
    },
}

struct Frame<'a> {
    mark: Option<&'a str>,
    children: Vec<MarkNode<'a>>,
}

/// Build the nested mark tree for a run of spans.
pub(crate) fn build_mark_tree(spans: &[Span]) -> Vec<MarkNode<'_>> {
    let mut stack = vec![Frame {
        mark: None,
        children: Vec::new(),
    }];

    for (i, span) in spans.iter().enumerate() {
        let mut needed = marks_by_run_length(spans, i);

        // Keep the open frames whose marks this span still needs, up to the
        // first one it doesn't.
        let mut keep = 1;
        while keep < stack.len() {
            let Some(open) = stack[keep].mark else { break };
            match needed.iter().position(|m| *m == open) {
                Some(pos) => {
                    needed.remove(pos);
                    keep += 1;
                }
                None => break,
            }
        }
        close_frames(&mut stack, keep);

        for mark in needed {
            stack.push(Frame {
                mark: Some(mark),
                children: Vec::new(),
            });
        }
        if let Some(top) = stack.last_mut() {
            top.children.push(MarkNode::Text(&span.text));
        }
    }

    close_frames(&mut stack, 1);
    stack.pop().map(|root| root.children).unwrap_or_default()
}

fn close_frames<'a>(stack: &mut Vec<Frame<'a>>, keep: usize) {
    while stack.len() > keep {
        let Some(frame) = stack.pop() else { return };
        let Some(parent) = stack.last_mut() else { return };
        parent.children.push(MarkNode::Marked {
            mark: frame.mark.unwrap_or_default(),
            children: frame.children,
        });
    }
}

/// Marks of `spans[index]`, longest consecutive run first.
fn marks_by_run_length(spans: &[Span], index: usize) -> Vec<&str> {
    let mut marks: Vec<(&str, usize)> = spans[index]
        .marks
        .iter()
        .map(|mark| {
            let run = 1 + spans[index + 1..]
                .iter()
                .take_while(|sibling| sibling.marks.contains(mark))
                .count();
            (mark.as_str(), run)
        })
        .collect();

    // Unknown keys sort ahead of known decorators on ties.
    marks.sort_by_key(|(mark, run)| {
        let known = DECORATORS
            .iter()
            .position(|d| d == mark)
            .map_or(-1, |p| p as i32);
        (Reverse(*run), known, *mark)
    });
    marks.into_iter().map(|(mark, _)| mark).collect()
}
