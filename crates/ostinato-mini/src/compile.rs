use crate::ast::{
    Alignment, AtomNode, AtomValue, ClauseKind, ElementNode, ElementOp, GroupNode, Node, Statement,
};
use crate::error::ParseError;
use crate::note::{parse_note, voice_index};
use crate::parser::parse_statement;
use crate::span::Span;
use ostinato_core::{
    fastcat, polymeter, pure, silence, slowcat, stack, timecat, Fraction, Pattern, TidalEvent,
};

/// Parses and compiles a statement in one go.
pub fn compile(source: &str) -> Result<Pattern<TidalEvent>, ParseError> {
    compile_statement(&parse_statement(source)?)
}

/// Compiles a parsed statement. Clauses joined by `#` stack into one
/// pattern.
pub fn compile_statement(statement: &Statement) -> Result<Pattern<TidalEvent>, ParseError> {
    let mut layers = Vec::with_capacity(statement.clauses.len());
    for clause in &statement.clauses {
        layers.push(compile_node(&clause.pattern, &clause.kind)?);
    }
    if layers.len() == 1 {
        Ok(layers.remove(0))
    } else {
        Ok(stack(layers))
    }
}

fn compile_node(node: &Node, kind: &ClauseKind) -> Result<Pattern<TidalEvent>, ParseError> {
    match node {
        Node::Atom(atom) => compile_atom(atom, kind),
        Node::Group(group) => compile_group(group, kind),
        Node::Element(element) => compile_element(element, kind),
    }
}

fn compile_atom(atom: &AtomNode, kind: &ClauseKind) -> Result<Pattern<TidalEvent>, ParseError> {
    let event = match &atom.value {
        AtomValue::Rest => return Ok(silence()),
        AtomValue::Number(n) => event_from_number(kind, *n, atom.span)?,
        AtomValue::Name(name) => event_from_name(kind, name, atom.span)?,
    };
    Ok(tag(pure(event), atom.span))
}

/// Every hap produced by an atom remembers where in the source it came
/// from.
fn tag(pattern: Pattern<TidalEvent>, span: Span) -> Pattern<TidalEvent> {
    pattern.with_hap(move |hap| hap.with_location((span.start, span.end)))
}

fn event_from_number(kind: &ClauseKind, n: f64, span: Span) -> Result<TidalEvent, ParseError> {
    match kind {
        ClauseKind::Gate => Ok(TidalEvent::Gate {
            voice: voice_index(n, span)?,
        }),
        ClauseKind::Note => {
            if n.fract() != 0.0 {
                return Err(ParseError::invalid("note number must be an integer", span));
            }
            let midi = n as i64;
            if !(0..=127).contains(&midi) {
                return Err(ParseError::NoteOutOfRange { value: midi, span });
            }
            Ok(TidalEvent::Note { midi: midi as u8 })
        }
        ClauseKind::Sample => {
            let name = if n.fract() == 0.0 {
                format!("{}", n as i64)
            } else {
                format!("{n}")
            };
            Ok(TidalEvent::Sample { name })
        }
        ClauseKind::Float { param } => Ok(TidalEvent::Float {
            param: param.clone(),
            value: n,
        }),
    }
}

fn event_from_name(kind: &ClauseKind, name: &str, span: Span) -> Result<TidalEvent, ParseError> {
    match kind {
        ClauseKind::Gate => Err(ParseError::invalid("expected a voice number", span)),
        ClauseKind::Note => Ok(TidalEvent::Note {
            midi: parse_note(name, span)?,
        }),
        ClauseKind::Sample => Ok(TidalEvent::Sample {
            name: name.to_string(),
        }),
        ClauseKind::Float { .. } => Err(ParseError::invalid("expected a number", span)),
    }
}

fn compile_group(group: &GroupNode, kind: &ClauseKind) -> Result<Pattern<TidalEvent>, ParseError> {
    match group.alignment {
        Alignment::Fastcat => {
            let weighted = group.children.iter().any(|child| weight_of(child) != 1.0);
            if weighted {
                let mut pairs = Vec::with_capacity(group.children.len());
                for child in &group.children {
                    pairs.push((
                        Fraction::from_float(weight_of(child)),
                        compile_node(child, kind)?,
                    ));
                }
                Ok(timecat(pairs))
            } else {
                let mut children = Vec::with_capacity(group.children.len());
                for child in &group.children {
                    children.push(compile_node(child, kind)?);
                }
                Ok(fastcat(children))
            }
        }
        Alignment::Slowcat => {
            let mut children = Vec::with_capacity(group.children.len());
            for child in &group.children {
                children.push(compile_node(child, kind)?);
            }
            Ok(slowcat(children))
        }
        Alignment::Stack => {
            let mut children = Vec::with_capacity(group.children.len());
            for child in &group.children {
                children.push(compile_node(child, kind)?);
            }
            Ok(stack(children))
        }
        Alignment::Polymeter => {
            let mut branches = Vec::with_capacity(group.children.len());
            for child in &group.children {
                let steps = match child {
                    Node::Group(branch) => branch.children.len() as i64,
                    _ => 1,
                };
                branches
                    .push(compile_node(child, kind)?.set_steps(Some(Fraction::from_int(steps))));
            }
            Ok(polymeter(
                branches,
                group.steps_override.map(|n| Fraction::from_int(n as i64)),
            ))
        }
    }
}

fn weight_of(node: &Node) -> f64 {
    match node {
        Node::Element(element) => element.weight,
        _ => 1.0,
    }
}

fn compile_element(
    element: &ElementNode,
    kind: &ClauseKind,
) -> Result<Pattern<TidalEvent>, ParseError> {
    let range_end = element.ops.iter().find_map(|op| match op {
        ElementOp::Range { end } => Some(end),
        _ => None,
    });
    let mut pattern = match range_end {
        Some(end) => compile_range(&element.source, end, kind)?,
        None => compile_node(&element.source, kind)?,
    };
    for op in &element.ops {
        match op {
            ElementOp::Fast(n) => pattern = pattern.fast(Fraction::from_float(*n)),
            ElementOp::Slow(n) => pattern = pattern.slow(Fraction::from_float(*n)),
            ElementOp::Euclid {
                pulses,
                steps,
                rotation,
                span,
            } => {
                let pulses = non_negative_int(*pulses, "pulse count", *span)?;
                let steps = non_negative_int(*steps, "step count", *span)?;
                if steps == 0 {
                    return Err(ParseError::invalid("step count must be positive", *span));
                }
                let rotation = match rotation {
                    Some(r) => {
                        if r.fract() != 0.0 {
                            return Err(ParseError::invalid(
                                "rotation must be an integer",
                                *span,
                            ));
                        }
                        *r as i64
                    }
                    None => 0,
                };
                pattern = pattern.euclid(pulses as usize, steps as usize, rotation);
            }
            ElementOp::Range { .. } => {}
        }
    }
    Ok(pattern)
}

fn non_negative_int(n: f64, what: &str, span: Span) -> Result<u64, ParseError> {
    if n.fract() != 0.0 || n < 0.0 {
        return Err(ParseError::invalid(
            format!("{what} must be a non-negative integer"),
            span,
        ));
    }
    Ok(n as u64)
}

/// `a..b` expands to the inclusive run of integers between the bounds,
/// ascending or descending, as a sequence within one step.
fn compile_range(
    source: &Node,
    end: &Node,
    kind: &ClauseKind,
) -> Result<Pattern<TidalEvent>, ParseError> {
    let (from, from_span) = range_bound(source)?;
    let (to, to_span) = range_bound(end)?;
    let values: Vec<i64> = if from <= to {
        (from..=to).collect()
    } else {
        (to..=from).rev().collect()
    };
    let span = from_span.merge(&to_span);
    let mut steps = Vec::with_capacity(values.len());
    for value in values {
        steps.push(tag(pure(event_from_number(kind, value as f64, span)?), span));
    }
    Ok(fastcat(steps))
}

fn range_bound(node: &Node) -> Result<(i64, Span), ParseError> {
    match node {
        Node::Atom(AtomNode {
            value: AtomValue::Number(n),
            span,
        }) if n.fract() == 0.0 => Ok((*n as i64, *span)),
        other => Err(ParseError::invalid(
            "range bounds must be integers",
            other.span(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ostinato_core::{query_cycle, Hap};

    fn onsets(source: &str, cycle: i64) -> Vec<(Fraction, TidalEvent)> {
        let pattern = compile(source).unwrap();
        let mut haps: Vec<_> = query_cycle(&pattern, cycle)
            .into_iter()
            .filter(Hap::has_onset)
            .map(|h| (h.part.begin, h.value))
            .collect();
        haps.sort_by(|a, b| a.0.cmp(&b.0));
        haps
    }

    fn gate(voice: usize) -> TidalEvent {
        TidalEvent::Gate { voice }
    }

    fn f(n: i64, d: i64) -> Fraction {
        Fraction::new(n, d)
    }

    #[test]
    fn gates_are_one_based_in_the_text() {
        let haps = onsets("gate \"1 2 3\"", 0);
        assert_eq!(
            haps,
            vec![
                (f(0, 1), gate(0)),
                (f(1, 3), gate(1)),
                (f(2, 3), gate(2)),
            ]
        );
    }

    #[test]
    fn gate_zero_and_thirteen_are_out_of_range() {
        assert!(matches!(
            compile("gate \"0\""),
            Err(ParseError::VoiceOutOfRange { value: 0, .. })
        ));
        assert!(matches!(
            compile("gate \"13\""),
            Err(ParseError::VoiceOutOfRange { value: 13, .. })
        ));
    }

    #[test]
    fn notes_accept_names_and_numbers() {
        let haps = onsets("note \"c4 69 eb3\"", 0);
        assert_eq!(haps[0].1, TidalEvent::Note { midi: 60 });
        assert_eq!(haps[1].1, TidalEvent::Note { midi: 69 });
        assert_eq!(haps[2].1, TidalEvent::Note { midi: 51 });
    }

    #[test]
    fn unknown_note_names_are_rejected_with_the_offending_text() {
        let err = compile("note \"c3 h3\"").unwrap_err();
        assert!(err.to_string().contains("invalid note 'h3'"));
        let source = "note \"c3 h3\"";
        let span = err.span().unwrap();
        assert_eq!(&source[span.to_range()], "h3");
    }

    #[test]
    fn rests_produce_no_events() {
        let haps = onsets("s \"bd ~ sd\"", 0);
        assert_eq!(haps.len(), 2);
        assert_eq!(haps[1].0, f(2, 3));
    }

    #[test]
    fn elongation_reweights_the_cycle() {
        let haps = onsets("gate \"1@2 2\"", 0);
        assert_eq!(haps, vec![(f(0, 1), gate(0)), (f(2, 3), gate(1))]);
    }

    #[test]
    fn fast_and_slow_modifiers() {
        let haps = onsets("s \"bd*2 sd\"", 0);
        let begins: Vec<_> = haps.iter().map(|h| h.0).collect();
        assert_eq!(begins, vec![f(0, 1), f(1, 4), f(1, 2)]);

        assert_eq!(onsets("s \"bd/2\"", 0).len(), 1);
        assert_eq!(onsets("s \"bd/2\"", 1).len(), 0);
    }

    #[test]
    fn euclid_modifier_places_tresillo() {
        let begins: Vec<_> = onsets("s \"bd(3,8)\"", 0).iter().map(|h| h.0).collect();
        assert_eq!(begins, vec![f(0, 1), f(3, 8), f(3, 4)]);
    }

    #[test]
    fn alternation_advances_each_cycle() {
        assert_eq!(onsets("note \"<c3 e3>\"", 0)[0].1, TidalEvent::Note { midi: 48 });
        assert_eq!(onsets("note \"<c3 e3>\"", 1)[0].1, TidalEvent::Note { midi: 52 });
        assert_eq!(onsets("note \"<c3 e3>\"", 2)[0].1, TidalEvent::Note { midi: 48 });
    }

    #[test]
    fn range_expands_inclusively_in_both_directions() {
        let up = onsets("gate \"1..4\"", 0);
        let voices: Vec<_> = up.iter().map(|h| h.1.clone()).collect();
        assert_eq!(voices, vec![gate(0), gate(1), gate(2), gate(3)]);

        let down = onsets("note \"3..0\"", 0);
        let notes: Vec<_> = down.iter().map(|h| h.1.clone()).collect();
        assert_eq!(
            notes,
            vec![
                TidalEvent::Note { midi: 3 },
                TidalEvent::Note { midi: 2 },
                TidalEvent::Note { midi: 1 },
                TidalEvent::Note { midi: 0 },
            ]
        );
    }

    #[test]
    fn polymeter_follows_the_first_branch_length() {
        let haps = onsets("gate \"{1 2 3, 4 5}\"", 0);
        let voices: Vec<_> = haps.iter().map(|h| h.1.clone()).collect();
        assert_eq!(
            voices,
            vec![gate(0), gate(3), gate(1), gate(4), gate(2), gate(3)]
        );
    }

    #[test]
    fn stacked_clauses_layer_their_events() {
        let haps = onsets("note \"c3\" # cutoff 0.5", 0);
        assert_eq!(haps.len(), 2);
        assert!(haps.iter().any(|h| h.1 == TidalEvent::Note { midi: 48 }));
        assert!(haps.iter().any(|h| h.1
            == TidalEvent::Float {
                param: "cutoff".into(),
                value: 0.5
            }));
    }

    #[test]
    fn indexed_params_keep_their_index_in_the_name() {
        let haps = onsets("hold:0 0.8", 0);
        assert_eq!(
            haps[0].1,
            TidalEvent::Float {
                param: "hold:0".into(),
                value: 0.8
            }
        );
    }

    #[test]
    fn haps_carry_source_locations() {
        let source = "s \"bd sd\"";
        let pattern = compile(source).unwrap();
        let haps = query_cycle(&pattern, 0);
        let second = haps
            .iter()
            .find(|h| h.value == TidalEvent::Sample { name: "sd".into() })
            .unwrap();
        let (start, end) = second.context.locations[0];
        assert_eq!(&source[start..end], "sd");
    }

    #[test]
    fn float_clause_with_alternation() {
        assert_eq!(
            onsets("cutoff <0.2 0.9>", 0)[0].1,
            TidalEvent::Float {
                param: "cutoff".into(),
                value: 0.2
            }
        );
        assert_eq!(
            onsets("cutoff <0.2 0.9>", 1)[0].1,
            TidalEvent::Float {
                param: "cutoff".into(),
                value: 0.9
            }
        );
    }
}
