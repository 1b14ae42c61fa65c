//! Static trace parser.
//!
//! The static trace is a sequence of block records written once by the
//! instrumentation pass:
//!
//! ```text
//! <blockId:hex> <instrCount:dec> <funcName> <succCount:dec> [<succId:hex>]*
//! {
//! <instrId:hex> <numUses:dec> [<useBlockId:hex> <useInstrId:hex>]* <disassembly>
//! ...
//! }
//!
//! ```
//!
//! The disassembly is the remainder of the instruction line, or the next
//! line when nothing follows the last use-edge. Records are committed to
//! the graph when their closing brace is read, so a fault leaves every
//! earlier record in place.

use crate::graph::{BasicBlock, BlockId, GraphModel, InstrId, Instruction, UseEdge};
use crate::parser::lexer::{Token, TokenCursor, TokenKind};
use crate::utils::config::CLOSE_DELIMITER;
use crate::utils::error::ParseError;
use log::{debug, info};
use std::path::Path;

/// Position of the parser inside a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    ExpectHeader,
    ExpectOpenBrace,
    ExpectInstructionOrClose,
    ExpectBlankLine,
}

/// Counts collected over one static pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticTraceSummary {
    /// Records committed to the graph
    pub records: usize,

    pub instructions: usize,

    pub use_edges: usize,

    /// Records that replaced an earlier record with the same block id
    pub overwritten: usize,
}

/// A record whose header has been read but whose body is still open
struct PendingRecord {
    block: BasicBlock,
    declared_instructions: usize,
    instructions: Vec<Instruction>,
}

/// State machine over the static trace grammar
pub struct StaticTraceParser<'a> {
    cursor: TokenCursor<'a>,
    state: ParserState,
    pending: Option<PendingRecord>,
    summary: StaticTraceSummary,
}

impl<'a> StaticTraceParser<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            cursor: TokenCursor::new(src),
            state: ParserState::ExpectHeader,
            pending: None,
            summary: StaticTraceSummary::default(),
        }
    }

    /// Run the state machine to end of input, committing records into `graph`
    ///
    /// **Public** - main entry point of the parser
    ///
    /// # Errors
    /// * `ParseError::MalformedRecord` - a delimiter is missing or misplaced
    /// * `ParseError::InvalidNumber` - an id or count does not parse
    /// * `ParseError::UnexpectedEof` - input ends inside a record
    pub fn parse_into(mut self, graph: &mut GraphModel) -> Result<StaticTraceSummary, ParseError> {
        loop {
            match self.state {
                ParserState::ExpectHeader => {
                    if self.cursor.is_at_end() {
                        break;
                    }
                    self.pending = Some(parse_header(&mut self.cursor)?);
                    self.state = ParserState::ExpectOpenBrace;
                }
                ParserState::ExpectOpenBrace => {
                    let token = self.cursor.expect_token("'{'")?;
                    if token.kind() != TokenKind::OpenBrace {
                        return Err(malformed(&token, "'{'"));
                    }
                    self.state = ParserState::ExpectInstructionOrClose;
                }
                ParserState::ExpectInstructionOrClose => {
                    let Some(pending) = self.pending.as_mut() else {
                        self.state = ParserState::ExpectHeader;
                        continue;
                    };

                    if pending.instructions.len() < pending.declared_instructions {
                        let expected = format!(
                            "instruction {} of {}",
                            pending.instructions.len() + 1,
                            pending.declared_instructions
                        );
                        let instr = parse_instruction(&mut self.cursor, &expected)?;
                        pending.instructions.push(instr);
                        continue;
                    }

                    let token = self.cursor.expect_token("'}'")?;
                    if token.kind() != TokenKind::CloseBrace {
                        return Err(malformed(&token, "'}'"));
                    }
                    if let Some(record) = self.pending.take() {
                        self.commit(record, graph);
                    }
                    self.state = ParserState::ExpectBlankLine;
                }
                ParserState::ExpectBlankLine => {
                    let line = self.cursor.line();
                    let trailing = self.cursor.rest_of_line().trim();
                    if !trailing.is_empty() {
                        return Err(ParseError::MalformedRecord {
                            line,
                            expected: "end of line after '}'".to_string(),
                            found: trailing.to_string(),
                        });
                    }
                    match self.cursor.peek_line() {
                        Some(next) if next.trim().is_empty() => {
                            self.cursor.next_line();
                        }
                        Some(_) => debug!("No blank line after record ending at line {}", line),
                        None => {}
                    }
                    self.state = ParserState::ExpectHeader;
                }
            }
        }

        Ok(self.summary)
    }

    fn commit(&mut self, record: PendingRecord, graph: &mut GraphModel) {
        self.summary.records += 1;
        self.summary.instructions += record.instructions.len();
        self.summary.use_edges += record
            .instructions
            .iter()
            .map(|instr| instr.uses.len())
            .sum::<usize>();

        if graph.insert_block(record.block, record.instructions).is_some() {
            self.summary.overwritten += 1;
        }
    }
}

fn malformed(token: &Token<'_>, expected: &str) -> ParseError {
    ParseError::MalformedRecord {
        line: token.line,
        expected: expected.to_string(),
        found: format!("'{}'", token.text),
    }
}

/// Read `<blockId> <instrCount> <funcName> <succCount> [<succId>]*`
fn parse_header(cursor: &mut TokenCursor<'_>) -> Result<PendingRecord, ParseError> {
    let id = BlockId(cursor.expect_token("block id")?.as_hex()?);
    let declared_instructions = cursor.expect_token("instruction count")?.as_count()?;

    let function = cursor.expect_token("function name")?;
    if function.kind() != TokenKind::Word {
        return Err(malformed(&function, "function name"));
    }

    let mut block = BasicBlock::new(id, function.text);
    let successor_count = cursor.expect_token("successor count")?.as_count()?;
    for _ in 0..successor_count {
        let successor = cursor.expect_token("successor id")?.as_hex()?;
        block.add_successor(BlockId(successor));
    }

    debug!(
        "Record header for block {} at line {}: {} instructions declared",
        id,
        cursor.line(),
        declared_instructions
    );

    Ok(PendingRecord {
        block,
        declared_instructions,
        instructions: Vec::new(),
    })
}

/// Read `<instrId> <numUses> [<useBlockId> <useInstrId>]* <disassembly>`
fn parse_instruction(cursor: &mut TokenCursor<'_>, expected: &str) -> Result<Instruction, ParseError> {
    let id_token = cursor.expect_token(expected)?;
    if id_token.kind() == TokenKind::CloseBrace {
        return Err(malformed(&id_token, expected));
    }
    let id = InstrId(id_token.as_hex()?);

    let use_count = cursor.expect_token("use-edge count")?.as_count()?;
    let mut uses = Vec::new();
    for _ in 0..use_count {
        let block = cursor.expect_token("use-edge block id")?.as_hex()?;
        let instr = cursor.expect_token("use-edge instruction id")?.as_hex()?;
        uses.push(UseEdge::new(BlockId(block), InstrId(instr)));
    }

    let inline = cursor.rest_of_line().trim();
    let disassembly = if inline.is_empty() {
        let line = cursor.line();
        if cursor.peek_line().map(str::trim) == Some(CLOSE_DELIMITER) {
            return Err(ParseError::MalformedRecord {
                line,
                expected: format!("disassembly of instruction {}", id),
                found: format!("'{}'", CLOSE_DELIMITER),
            });
        }
        cursor
            .next_line()
            .ok_or_else(|| ParseError::UnexpectedEof {
                line,
                context: format!("disassembly of instruction {}", id),
            })?
            .trim()
    } else {
        inline
    };

    Ok(Instruction::new(id, disassembly).with_uses(uses))
}

/// Parse static trace text into `graph`
///
/// **Public** - convenience wrapper around `StaticTraceParser`
///
/// On error the graph keeps every record closed before the fault.
pub fn parse_static_trace(
    src: &str,
    graph: &mut GraphModel,
) -> Result<StaticTraceSummary, ParseError> {
    StaticTraceParser::new(src).parse_into(graph)
}

/// Read and parse a static trace file into `graph`
///
/// **Public** - used by the visualise command
pub fn parse_static_file(
    path: impl AsRef<Path>,
    graph: &mut GraphModel,
) -> Result<StaticTraceSummary, ParseError> {
    let path = path.as_ref();
    info!("Reading static trace: {}", path.display());
    let src = std::fs::read_to_string(path)?;
    let summary = parse_static_trace(&src, graph)?;
    info!(
        "Static trace: {} records, {} instructions, {} use-edges",
        summary.records, summary.instructions, summary.use_edges
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_terminal_block() {
        let mut graph = GraphModel::new();
        let summary = parse_static_trace("0 1 main 0\n{\n1 0 ret void\n}\n\n", &mut graph).unwrap();

        assert_eq!(summary.records, 1);
        let block = graph.block(BlockId(0)).unwrap();
        assert!(block.is_terminal());
        assert_eq!(graph.instruction(InstrId(1)).unwrap().disassembly, "ret void");
    }

    #[test]
    fn test_disassembly_on_following_line() {
        let src = "a 1 f 1 b\n{\n10 1\nb 20\n  %3 = add i32 %1, %2\n}\n\n";
        let mut graph = GraphModel::new();
        parse_static_trace(src, &mut graph).unwrap();

        let instr = graph.instruction(InstrId(0x10)).unwrap();
        assert_eq!(instr.disassembly, "%3 = add i32 %1, %2");
        assert_eq!(instr.uses, vec![UseEdge::new(BlockId(0xb), InstrId(0x20))]);
        assert_eq!(graph.block(BlockId(0xa)).unwrap().successors, vec![BlockId(0xb)]);
    }

    #[test]
    fn test_missing_open_brace() {
        let mut graph = GraphModel::new();
        let err = parse_static_trace("0 0 main 0\n[\n}\n", &mut graph).unwrap_err();
        assert!(matches!(err, ParseError::MalformedRecord { line: 2, .. }));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_early_close_brace() {
        let mut graph = GraphModel::new();
        let err = parse_static_trace("0 2 main 0\n{\n1 0 ret\n}\n\n", &mut graph).unwrap_err();
        assert!(matches!(err, ParseError::MalformedRecord { line: 4, .. }));
    }

    #[test]
    fn test_close_brace_in_place_of_disassembly() {
        let mut graph = GraphModel::new();
        let err = parse_static_trace("0 1 main 0\n{\n1 0\n}\n\n", &mut graph).unwrap_err();
        assert!(matches!(err, ParseError::MalformedRecord { line: 4, .. }));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_trailing_text_after_close_brace() {
        let mut graph = GraphModel::new();
        let err = parse_static_trace("0 0 main 0\n{\n} junk\n", &mut graph).unwrap_err();
        assert!(matches!(err, ParseError::MalformedRecord { line: 3, .. }));
        // the record itself was complete
        assert_eq!(graph.block_count(), 1);
    }

    #[test]
    fn test_eof_inside_record() {
        let mut graph = GraphModel::new();
        let err = parse_static_trace("0 1 main 0\n{\n", &mut graph).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_empty_input() {
        let mut graph = GraphModel::new();
        let summary = parse_static_trace("\n\n", &mut graph).unwrap();
        assert_eq!(summary, StaticTraceSummary::default());
    }
}
