//! Typed records built from the input document.

use crate::parser::Node;

/// Enumerator at index 0 of every section table.
pub const SECTION_SENTINEL: &str = "A0000ERROR";
/// Enumerator at index 0 of the glossary table.
pub const GLOSSARY_SENTINEL: &str = "A0000ERROR_C";

/// Names the emitter declares in the root namespace next to the glossary enum.
pub const ROOT_RESERVED: [&str; 6] = [
    GLOSSARY_SENTINEL,
    "th_glossary_t",
    "th_glossary_str",
    "__thprac_loc_range_zh",
    "__thprac_loc_range_en",
    "__thprac_loc_range_ja",
];
/// Names the emitter declares in every game namespace next to the section enum.
pub const NAMESPACE_RESERVED: [&str; 6] = [
    SECTION_SENTINEL,
    "th_sections_t",
    "th_sections_str",
    "th_sections_bgm",
    "th_sections_cba",
    "th_sections_cbt",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Chinese,
    English,
    Japanese,
}

impl Language {
    /// Order of the outer dimension of every string table.
    pub const ALL: [Language; 3] = [Language::Chinese, Language::English, Language::Japanese];

    pub fn suffix(self) -> &'static str {
        match self {
            Language::Chinese => "zh",
            Language::English => "en",
            Language::Japanese => "ja",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Lunatic,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Lunatic,
    ];
}

/// Destination of one character of a `!` rank key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankTarget {
    One(Difficulty),
    All,
}

impl RankTarget {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'E' => Some(RankTarget::One(Difficulty::Easy)),
            'N' => Some(RankTarget::One(Difficulty::Normal)),
            'H' => Some(RankTarget::One(Difficulty::Hard)),
            'L' => Some(RankTarget::One(Difficulty::Lunatic)),
            'X' => Some(RankTarget::All),
            _ => None,
        }
    }
}

/// One string per language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedTriple {
    pub zh: String,
    pub en: String,
    pub ja: String,
}

impl LocalizedTriple {
    pub fn new(zh: impl Into<String>, en: impl Into<String>, ja: impl Into<String>) -> Self {
        Self {
            zh: zh.into(),
            en: en.into(),
            ja: ja.into(),
        }
    }

    /// `["zh", "en", "ja"]`, nothing else.
    pub fn from_node(node: &Node) -> Option<Self> {
        match node.as_array()? {
            [zh, en, ja] => Some(Self::new(zh.as_str()?, en.as_str()?, ja.as_str()?)),
            _ => None,
        }
    }

    pub fn get(&self, lang: Language) -> &str {
        match lang {
            Language::Chinese => &self.zh,
            Language::English => &self.en,
            Language::Japanese => &self.ja,
        }
    }
}

/// Localized strings of a section, one slot per difficulty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankSlots {
    pub easy: Option<LocalizedTriple>,
    pub normal: Option<LocalizedTriple>,
    pub hard: Option<LocalizedTriple>,
    pub lunatic: Option<LocalizedTriple>,
}

impl RankSlots {
    pub fn get(&self, difficulty: Difficulty) -> Option<&LocalizedTriple> {
        match difficulty {
            Difficulty::Easy => self.easy.as_ref(),
            Difficulty::Normal => self.normal.as_ref(),
            Difficulty::Hard => self.hard.as_ref(),
            Difficulty::Lunatic => self.lunatic.as_ref(),
        }
    }

    pub fn assign(&mut self, target: RankTarget, triple: &LocalizedTriple) {
        match target {
            RankTarget::One(Difficulty::Easy) => self.easy = Some(triple.clone()),
            RankTarget::One(Difficulty::Normal) => self.normal = Some(triple.clone()),
            RankTarget::One(Difficulty::Hard) => self.hard = Some(triple.clone()),
            RankTarget::One(Difficulty::Lunatic) => self.lunatic = Some(triple.clone()),
            RankTarget::All => {
                for d in Difficulty::ALL {
                    self.assign(RankTarget::One(d), triple);
                }
            }
        }
    }

    /// Emitted text for a slot; unset slots are empty strings.
    pub fn text(&self, difficulty: Difficulty, lang: Language) -> &str {
        self.get(difficulty).map_or("", |t| t.get(lang))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub bgm: i32,
    /// 1-based coordinates; `None` until the document sets them.
    pub appearance: Option<[i32; 3]>,
    pub spell: i32,
    /// Stored as written; nothing downstream resolves it.
    pub reference: Option<String>,
    pub ranks: RankSlots,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bgm: 0,
            appearance: None,
            spell: 0,
            reference: None,
            ranks: RankSlots::default(),
        }
    }

    pub fn is_spellcard(&self) -> bool {
        self.spell != 0
    }
}

/// Validated group tree: strings at the leaves, arrays everywhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupTree {
    Leaf(String),
    Branch(Vec<GroupTree>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub tree: GroupTree,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Game {
    pub name: String,
    pub namespace: String,
    pub sections: Vec<Section>,
    pub groups: Vec<Group>,
}

impl Game {
    /// Games without a namespace only contribute glossary entries and groups.
    pub fn is_real(&self) -> bool {
        !self.namespace.is_empty()
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
