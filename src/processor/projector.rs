//! Dense views of a game's sections keyed by their `appearance` tag.

use crate::model::Section;

use super::context::GenContext;

/// `[appearance[0]-1][appearance[1]-1][appearance[2]-1]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByAppearance {
    pub cells: Vec<Vec<Vec<Option<String>>>>,
}

impl ByAppearance {
    /// The innermost dimension reserves one extra (always empty) slot.
    pub fn bounds(&self) -> [usize; 3] {
        let d0 = self.cells.len();
        let d1 = self.cells.first().map_or(0, Vec::len);
        let d2 = self
            .cells
            .first()
            .and_then(|c| c.first())
            .map_or(0, Vec::len);
        [d0, d1, d2 + 1]
    }

    /// Populated prefix of one innermost run; stops at the first gap.
    pub fn run(cells: &[Option<String>]) -> impl Iterator<Item = &str> {
        cells.iter().map_while(|c| c.as_deref())
    }
}

/// `[appearance[0]-1][normal | spellcard]`, each a list in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByType {
    pub lists: Vec<[Vec<String>; 2]>,
    pub longest: usize,
}

impl ByType {
    pub fn bounds(&self) -> [usize; 3] {
        [self.lists.len(), 2, self.longest + 1]
    }

    /// Every declared slot of one list, padded with `sentinel`.
    pub fn padded<'a>(&'a self, list: &'a [String], sentinel: &'a str) -> impl Iterator<Item = &'a str> {
        let [.., width] = self.bounds();
        list.iter()
            .map(String::as_str)
            .chain(std::iter::repeat(sentinel))
            .take(width)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projections {
    pub by_appearance: ByAppearance,
    pub by_type: ByType,
}

/// Upper bound on the cells of the by-appearance table, before the extra
/// innermost slot. Sections that would grow the table past it are omitted.
pub const MAX_CELLS: usize = 4096;

/// Sections whose appearance is usable as an index, warning about the rest,
/// and the table dimensions they need.
fn placed<'a>(
    game: &str,
    sections: &'a [Section],
    ctx: &mut GenContext,
) -> (Vec<(&'a Section, [usize; 3])>, [usize; 3]) {
    let mut placed = Vec::with_capacity(sections.len());
    let mut dims = [1usize; 3];
    for section in sections {
        let coords = match section.appearance {
            Some(coords) if coords.iter().all(|&c| c >= 1) => coords,
            Some([a, b, c]) => {
                ctx.warn(format!(
                    "Warning: In game \"{game}\", section \"{}\": Appearance ({a}, {b}, {c}) has a coordinate below 1, omitted from section categories.",
                    section.name
                ));
                continue;
            }
            None => {
                ctx.warn(format!(
                    "Warning: In game \"{game}\", section \"{}\": No appearance set, omitted from section categories.",
                    section.name
                ));
                continue;
            }
        };

        let idx = coords.map(|c| (c - 1) as usize);
        let mut grown = dims;
        for (dim, i) in grown.iter_mut().zip(idx) {
            *dim = (*dim).max(i + 1);
        }
        let cells = grown
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .filter(|&n| n <= MAX_CELLS);
        if cells.is_none() {
            let [a, b, c] = coords;
            ctx.warn(format!(
                "Warning: In game \"{game}\", section \"{}\": Appearance ({a}, {b}, {c}) would grow section categories beyond {MAX_CELLS} cells, omitted from section categories.",
                section.name
            ));
            continue;
        }
        dims = grown;
        placed.push((section, idx));
    }
    (placed, dims)
}

pub fn project(game: &str, sections: &[Section], ctx: &mut GenContext) -> Projections {
    let (placed, dims) = placed(game, sections, ctx);

    let mut cells = vec![vec![vec![None; dims[2]]; dims[1]]; dims[0]];
    let mut lists = vec![[Vec::new(), Vec::new()]; dims[0]];
    for (section, [i0, i1, i2]) in placed {
        let cell: &mut Option<String> = &mut cells[i0][i1][i2];
        if let Some(previous) = cell.replace(section.name.clone()) {
            ctx.warn(format!(
                "Warning: In game \"{game}\": Sections \"{previous}\" and \"{}\" share appearance ({}, {}, {}), keeping \"{}\".",
                section.name,
                i0 + 1,
                i1 + 1,
                i2 + 1,
                section.name
            ));
        }
        lists[i0][usize::from(section.is_spellcard())].push(section.name.clone());
    }

    let longest = lists
        .iter()
        .flat_map(|pair| pair.iter().map(Vec::len))
        .max()
        .unwrap_or(0);

    Projections {
        by_appearance: ByAppearance { cells },
        by_type: ByType { lists, longest },
    }
}
