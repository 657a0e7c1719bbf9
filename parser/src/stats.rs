//! Statistics about a translated [`Program`].
//!
//! ```
//! # use ippcode23_parser::{translate, LeniencyLevel};
//! # use ippcode23_parser::stats::{Stat, Stats};
//! let program = translate(".IPPcode23\nJUMP end # skip\nLABEL end\nJUMP end\n", LeniencyLevel::Lenient).unwrap();
//! let stats = Stats::collect(&program);
//! assert_eq!(stats.report(&[Stat::Jumps, Stat::FwJumps, Stat::BackJumps]), "2\n1\n1\n");
//! ```

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use itertools::Itertools;

use crate::catalog::Opcode;
use crate::program::Program;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Stat {
    /// Instructions.
    Loc,
    /// Source lines with a comment.
    Comments,
    /// Distinct labels defined with `LABEL`.
    Labels,
    /// Instructions that may transfer control, `RETURN` included.
    Jumps,
    /// Jumps to a label defined after the jump.
    FwJumps,
    /// Jumps to a label defined before the jump.
    BackJumps,
    /// Jumps to a label that's never defined.
    BadJumps,
}

pub const ALL: [Stat; 7] = [
    Stat::Loc,
    Stat::Comments,
    Stat::Labels,
    Stat::Jumps,
    Stat::FwJumps,
    Stat::BackJumps,
    Stat::BadJumps,
];

impl Stat {
    pub fn name(self) -> &'static str {
        match self {
            Stat::Loc => "loc",
            Stat::Comments => "comments",
            Stat::Labels => "labels",
            Stat::Jumps => "jumps",
            Stat::FwJumps => "fwjumps",
            Stat::BackJumps => "backjumps",
            Stat::BadJumps => "badjumps",
        }
    }
}

impl Display for Stat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownStat(pub String);

impl Display for UnknownStat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown statistic `{}`, expected one of {}", self.0, ALL.iter().join(", "))
    }
}

impl std::error::Error for UnknownStat {}

impl FromStr for Stat {
    type Err = UnknownStat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL.iter()
            .copied()
            .find(|stat| stat.name() == s)
            .ok_or_else(|| UnknownStat(s.to_string()))
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    pub loc: usize,
    pub comments: usize,
    pub labels: usize,
    pub jumps: usize,
    pub fwjumps: usize,
    pub backjumps: usize,
    pub badjumps: usize,
}

impl Stats {
    pub fn collect(program: &Program) -> Self {
        let instructions = program.instructions();

        // Where each label is first defined.
        let mut definitions = HashMap::new();
        for instruction in instructions.iter().filter(|instruction| instruction.opcode() == Opcode::Label) {
            if let Some(label) = instruction.operands().first().and_then(|operand| operand.label()) {
                definitions.entry(label).or_insert(instruction.order());
            }
        }

        let mut stats = Stats {
            loc: instructions.len(),
            comments: program.comments(),
            labels: definitions.len(),
            ..Stats::default()
        };

        for instruction in instructions.iter().filter(|instruction| instruction.opcode().is_jump()) {
            stats.jumps += 1;
            let target = match instruction.operands().first().and_then(|operand| operand.label()) {
                Some(target) => target,
                None => continue,
            };
            match definitions.get(target) {
                Some(&defined) if defined > instruction.order() => stats.fwjumps += 1,
                Some(_) => stats.backjumps += 1,
                None => stats.badjumps += 1,
            }
        }

        stats
    }

    pub fn get(&self, stat: Stat) -> usize {
        match stat {
            Stat::Loc => self.loc,
            Stat::Comments => self.comments,
            Stat::Labels => self.labels,
            Stat::Jumps => self.jumps,
            Stat::FwJumps => self.fwjumps,
            Stat::BackJumps => self.backjumps,
            Stat::BadJumps => self.badjumps,
        }
    }

    /// One value per line, in the order asked for.
    pub fn report(&self, stats: &[Stat]) -> String {
        stats.iter()
            .map(|stat| format!("{}\n", self.get(*stat)))
            .join("")
    }
}
