//! Walks the document tree and builds typed `Game` records.
//!
//! Nothing in here is fatal: every malformed item is reported through the
//! context and skipped, and the walk carries on with the next sibling.

use std::collections::HashSet;

use crate::model::{
    Game, Group, LocalizedTriple, NAMESPACE_RESERVED, ROOT_RESERVED, RankTarget, Section,
    is_identifier,
};
use crate::parser::Node;

use super::context::GenContext;
use super::group;

pub fn walk(root: &Node, ctx: &mut GenContext) -> Vec<Game> {
    let Some(members) = root.as_object() else {
        ctx.warn(format!(
            "Warning: Document root is a {}, not an object, ignoring.",
            root.kind()
        ));
        return Vec::new();
    };

    let mut games = Vec::with_capacity(members.len());
    for (name, value) in members {
        let Some(fields) = value.as_object() else {
            ctx.warn(format!(
                "Warning: A non-object value for game \"{name}\" has been detected, ignoring."
            ));
            continue;
        };
        log::info!("Processing game: {name}");
        games.push(walk_game(name, fields, ctx));
    }
    games
}

const GAME_FIELDS: [&str; 4] = ["namespace", "glossary", "sections", "groups"];

/// First member named `key`. Later duplicates are ignored.
fn field<'a>(fields: &'a [(String, Node)], key: &str) -> Option<&'a Node> {
    fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

fn walk_game(name: &str, fields: &[(String, Node)], ctx: &mut GenContext) -> Game {
    let mut game = Game {
        name: name.to_owned(),
        ..Game::default()
    };

    // Fixed order, so sections see this game's glossary wherever its key sits.
    match field(fields, "namespace").map(Node::as_str) {
        Some(Some(ns)) if ns.is_empty() || is_identifier(ns) => game.namespace = ns.to_owned(),
        Some(Some(ns)) => ctx.warn(format!(
            "Warning: In game \"{name}\": Namespace \"{ns}\" is not a valid identifier, ignoring."
        )),
        Some(None) => ctx.warn(format!(
            "Warning: In game \"{name}\": Invalid namespace value, ignoring."
        )),
        None => {}
    }
    match field(fields, "glossary").map(Node::as_object) {
        Some(Some(items)) => walk_glossary(name, items, ctx),
        Some(None) => ctx.warn(format!(
            "Warning: In game \"{name}\": Invalid glossary value, ignoring."
        )),
        None => {}
    }
    match field(fields, "sections").map(Node::as_object) {
        Some(Some(items)) => game.sections = walk_sections(name, items, ctx),
        Some(None) => ctx.warn(format!(
            "Warning: In game \"{name}\": Invalid sections value, ignoring."
        )),
        None => {}
    }
    match field(fields, "groups").map(Node::as_object) {
        Some(Some(items)) => game.groups = walk_groups(name, items, ctx),
        Some(None) => ctx.warn(format!(
            "Warning: In game \"{name}\": Invalid groups value, ignoring."
        )),
        None => {}
    }

    for (key, _) in fields {
        if !GAME_FIELDS.contains(&key.as_str()) {
            ctx.warn(format!(
                "Warning: In game \"{name}\": Unrecognized game property: {key}, ignoring."
            ));
        }
    }

    game
}

fn walk_glossary(game: &str, items: &[(String, Node)], ctx: &mut GenContext) {
    for (key, value) in items {
        let Some(triple) = LocalizedTriple::from_node(value) else {
            ctx.warn(format!(
                "Warning: In game \"{game}\": Invalid glossary item: \"{key}\", ignoring."
            ));
            continue;
        };
        if !is_identifier(key) {
            ctx.warn(format!(
                "Warning: In game \"{game}\": Glossary key \"{key}\" is not a valid identifier, ignoring."
            ));
            continue;
        }
        if ROOT_RESERVED.contains(&key.as_str()) {
            ctx.warn(format!(
                "Warning: In game \"{game}\": Glossary key \"{key}\" is reserved, ignoring."
            ));
            continue;
        }
        if ctx.define(key, triple).is_some() {
            ctx.warn(format!(
                "Warning: In game \"{game}\": Glossary item \"{key}\" redefined, overwriting the previous value."
            ));
        }
    }
}

fn walk_sections(game: &str, items: &[(String, Node)], ctx: &mut GenContext) -> Vec<Section> {
    let mut seen = HashSet::new();
    let mut sections = Vec::with_capacity(items.len());

    for (name, value) in items {
        let Some(fields) = value.as_object() else {
            ctx.warn(format!(
                "Warning: In game \"{game}\": Incorrect section: {name}, ignoring."
            ));
            continue;
        };
        if !is_identifier(name) {
            ctx.warn(format!(
                "Warning: In game \"{game}\": Section name \"{name}\" is not a valid identifier, ignoring."
            ));
            continue;
        }
        if NAMESPACE_RESERVED.contains(&name.as_str()) {
            ctx.warn(format!(
                "Warning: In game \"{game}\": Section name \"{name}\" is reserved, ignoring."
            ));
            continue;
        }
        if !seen.insert(name.as_str()) {
            ctx.warn(format!(
                "Warning: In game \"{game}\": Duplicate section: {name}, ignoring."
            ));
            continue;
        }

        let mut section = Section::new(name.as_str());
        fill_section(game, &mut section, fields, ctx);
        sections.push(section);
    }
    sections
}

fn fill_section(game: &str, section: &mut Section, fields: &[(String, Node)], ctx: &mut GenContext) {
    let prefix = format!("Warning: In game \"{game}\", section \"{}\":", section.name);

    for (key, value) in fields {
        if let Some(suffix) = key.strip_prefix('!') {
            assign_rank(&prefix, section, key, suffix, value, ctx);
            continue;
        }

        match key.as_str() {
            "bgm" => match value.as_int() {
                Some(id) if (0..=i32::from(u8::MAX)).contains(&id) => section.bgm = id,
                Some(id) => ctx.warn(format!(
                    "{prefix} BGM id {id} does not fit in uint8_t, ignoring."
                )),
                None => ctx.warn(format!("{prefix} Incorrect property switch: {key}, ignoring.")),
            },
            "appearance" => match value.as_array() {
                Some([a, b, c]) => match (a.as_int(), b.as_int(), c.as_int()) {
                    (Some(a), Some(b), Some(c)) => section.appearance = Some([a, b, c]),
                    _ => ctx.warn(format!("{prefix} Incorrect property switch: {key}, ignoring.")),
                },
                _ => ctx.warn(format!("{prefix} Incorrect property switch: {key}, ignoring.")),
            },
            "spell" => match value.as_int() {
                Some(id) => section.spell = id,
                None => ctx.warn(format!("{prefix} Incorrect property switch: {key}, ignoring.")),
            },
            "ref" => match value.as_str() {
                Some(r) => section.reference = Some(r.to_owned()),
                None => ctx.warn(format!("{prefix} Incorrect property switch: {key}, ignoring.")),
            },
            _ => ctx.warn(format!("{prefix} Unrecognized property: {key}, ignoring.")),
        }
    }
}

/// `!ENHLX` keys: an inline triple or a glossary key, copied into every
/// difficulty the suffix names.
fn assign_rank(
    prefix: &str,
    section: &mut Section,
    key: &str,
    suffix: &str,
    value: &Node,
    ctx: &mut GenContext,
) {
    let triple = if let Some(triple) = LocalizedTriple::from_node(value) {
        ctx.establish(triple)
    } else if let Some(reference) = value.as_str() {
        match ctx.resolve(reference) {
            Some(triple) => triple,
            None => {
                ctx.warn(format!("{prefix} Reference not found: {reference}, ignoring."));
                return;
            }
        }
    } else {
        ctx.warn(format!("{prefix} Incorrect rank switch value: {key}, ignoring."));
        return;
    };

    if suffix.is_empty() {
        ctx.warn(format!("{prefix} Empty rank switch: {key}, ignoring."));
        return;
    }

    for c in suffix.chars() {
        match RankTarget::from_char(c) {
            Some(target) => section.ranks.assign(target, &triple),
            None => {
                ctx.warn(format!("{prefix} Incorrect rank switch: {key}, ignoring."));
                break;
            }
        }
    }
}

fn walk_groups(game: &str, items: &[(String, Node)], ctx: &mut GenContext) -> Vec<Group> {
    let mut seen = HashSet::new();
    let mut groups = Vec::with_capacity(items.len());

    for (name, value) in items {
        let Some(tree) = group::validate(value) else {
            ctx.warn(format!(
                "Warning: In game \"{game}\": Incorrect group: {name}, ignoring."
            ));
            continue;
        };
        if !is_identifier(name) {
            ctx.warn(format!(
                "Warning: In game \"{game}\": Group name \"{name}\" is not a valid identifier, ignoring."
            ));
            continue;
        }
        if !seen.insert(name.as_str()) {
            ctx.warn(format!(
                "Warning: In game \"{game}\": Duplicate group: {name}, ignoring."
            ));
            continue;
        }
        groups.push(Group {
            name: name.clone(),
            tree,
        });
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, GroupTree};

    fn run(json: &str) -> (Vec<Game>, GenContext) {
        let root: Node = serde_json::from_str(json).unwrap();
        let mut ctx = GenContext::new();
        let games = walk(&root, &mut ctx);
        (games, ctx)
    }

    #[test]
    fn test_non_object_game_is_skipped() {
        let (games, ctx) = run(r#"{"bad": "oops", "TH06": {"namespace": "TH06"}}"#);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].name, "TH06");
        assert_eq!(ctx.warnings.len(), 1);
        assert!(ctx.warnings.report().contains("\"bad\""));
    }

    #[test]
    fn test_wrong_shaped_game_fields() {
        let (games, ctx) = run(
            r#"{"g": {"namespace": 1, "glossary": [], "sections": "x", "groups": 2, "extra": 0}}"#,
        );
        assert_eq!(games.len(), 1);
        assert!(!games[0].is_real());
        let lines: Vec<&str> = ctx.warnings.iter().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("namespace"));
        assert!(lines[1].contains("glossary"));
        assert!(lines[2].contains("sections"));
        assert!(lines[3].contains("groups"));
        assert!(lines[4].contains("extra"));
    }

    #[test]
    fn test_glossary_is_read_before_sections_whatever_the_key_order() {
        let (games, ctx) = run(
            r#"{"g": {"namespace": "G", "sections": {
                "a": {"appearance": [1, 1, 1], "!X": "k"}
            }, "glossary": {"k": ["zh", "EnglishText", "ja"]}}}"#,
        );
        assert!(ctx.warnings.is_empty(), "{}", ctx.warnings.report());
        let a = &games[0].sections[0];
        for d in Difficulty::ALL {
            assert_eq!(a.ranks.get(d).map(|t| t.en.as_str()), Some("EnglishText"));
        }
    }

    #[test]
    fn test_first_of_duplicate_game_fields_is_used() {
        let (games, ctx) = run(r#"{"g": {"namespace": "A", "namespace": "B"}}"#);
        assert_eq!(games[0].namespace, "A");
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn test_section_properties() {
        let (games, ctx) = run(
            r#"{"g": {"namespace": "G", "sections": {
                "st1": {"bgm": 3, "appearance": [1, 2, 3], "spell": 7, "ref": "other"}
            }}}"#,
        );
        assert!(ctx.warnings.is_empty(), "{}", ctx.warnings.report());
        let s = &games[0].sections[0];
        assert_eq!(s.bgm, 3);
        assert_eq!(s.appearance, Some([1, 2, 3]));
        assert_eq!(s.spell, 7);
        assert!(s.is_spellcard());
        assert_eq!(s.reference.as_deref(), Some("other"));
    }

    #[test]
    fn test_malformed_section_properties() {
        let test_cases = vec![
            r#"{"bgm": "3"}"#,
            r#"{"bgm": 300}"#,
            r#"{"bgm": 1.5}"#,
            r#"{"appearance": [1, 2]}"#,
            r#"{"appearance": [1, 2, "3"]}"#,
            r#"{"spell": true}"#,
            r#"{"ref": 4}"#,
            r#"{"colour": "red"}"#,
        ];

        for input in test_cases {
            let (games, ctx) = run(&format!(
                r#"{{"g": {{"namespace": "G", "sections": {{"st1": {input}}}}}}}"#
            ));
            assert_eq!(ctx.warnings.len(), 1, "{input}");
            let s = &games[0].sections[0];
            assert_eq!(s, &Section::new("st1"), "{input}");
        }
    }

    #[test]
    fn test_rank_wildcard_and_subset() {
        let (games, ctx) = run(
            r#"{"g": {"namespace": "G", "sections": {
                "a": {"!X": ["甲", "A", "あ"]},
                "b": {"!EH": ["乙", "B", "い"]}
            }}}"#,
        );
        assert!(ctx.warnings.is_empty());
        let a = &games[0].sections[0];
        for d in Difficulty::ALL {
            assert_eq!(a.ranks.get(d).map(|t| t.en.as_str()), Some("A"));
        }
        let b = &games[0].sections[1];
        assert!(b.ranks.easy.is_some());
        assert!(b.ranks.normal.is_none());
        assert!(b.ranks.hard.is_some());
        assert!(b.ranks.lunatic.is_none());
    }

    #[test]
    fn test_rank_glossary_reference() {
        let (games, ctx) = run(
            r#"{
                "common": {"glossary": {"boss": ["头目", "Boss", "ボス"]}},
                "g": {"namespace": "G", "sections": {
                    "a": {"!N": "boss", "!L": "missing"}
                }}
            }"#,
        );
        let a = &games[1].sections[0];
        assert_eq!(a.ranks.normal.as_ref(), ctx.glossary.get("boss"));
        assert!(a.ranks.lunatic.is_none());
        assert_eq!(ctx.warnings.len(), 1);
        assert!(ctx.warnings.report().contains("Reference not found: missing"));
    }

    #[test]
    fn test_bad_rank_suffix_stops_only_that_key() {
        let (games, ctx) = run(
            r#"{"g": {"namespace": "G", "sections": {
                "a": {"!EZH": ["e", "e", "e"], "!L": ["l", "l", "l"], "!N": 5}
            }}}"#,
        );
        let a = &games[0].sections[0];
        assert_eq!(a.ranks.easy.as_ref().map(|t| t.en.as_str()), Some("e"));
        assert!(a.ranks.hard.is_none());
        assert!(a.ranks.normal.is_none());
        assert_eq!(a.ranks.lunatic.as_ref().map(|t| t.en.as_str()), Some("l"));
        assert_eq!(ctx.warnings.len(), 2);
    }

    #[test]
    fn test_glossary_validation() {
        let (_, ctx) = run(
            r#"{
                "a": {"glossary": {"k": ["1", "1", "1"], "bad": ["1", "1"], "2x": ["1", "1", "1"]}},
                "b": {"glossary": {"k": ["2", "2", "2"]}}
            }"#,
        );
        assert_eq!(ctx.glossary.len(), 1);
        assert_eq!(ctx.glossary["k"].en, "2");
        assert_eq!(ctx.warnings.len(), 3);
    }

    #[test]
    fn test_sections_names() {
        let (games, ctx) = run(
            r#"{"g": {"namespace": "G", "sections": {
                "a": {}, "a": {"bgm": 1}, "1b": {}, "c": []
            }}}"#,
        );
        assert_eq!(games[0].sections.len(), 1);
        assert_eq!(games[0].sections[0].bgm, 0);
        assert_eq!(ctx.warnings.len(), 3);
    }

    #[test]
    fn test_reserved_names() {
        let (games, ctx) = run(
            r#"{"g": {"namespace": "G",
                "glossary": {"A0000ERROR_C": ["1", "1", "1"], "th_glossary_str": ["1", "1", "1"], "ok": ["1", "1", "1"]},
                "sections": {"A0000ERROR": {}, "th_sections_bgm": {}, "st1": {}}
            }}"#,
        );
        assert_eq!(ctx.glossary.keys().collect::<Vec<_>>(), vec!["ok"]);
        assert_eq!(games[0].sections.len(), 1);
        assert_eq!(games[0].sections[0].name, "st1");
        assert_eq!(ctx.warnings.len(), 4);
        assert!(ctx.warnings.iter().all(|w| w.contains("is reserved")));
    }

    #[test]
    fn test_groups() {
        let (games, ctx) = run(
            r#"{"g": {"groups": {
                "ok": [["A", "B"], ["C"]],
                "mixed": ["A", ["B"]],
                "num": [1],
                "injected": ["A\"; int evil = 1; //", "B"],
                "spaced": ["B C"]
            }}}"#,
        );
        assert_eq!(games[0].groups.len(), 1);
        assert_eq!(games[0].groups[0].name, "ok");
        assert!(matches!(games[0].groups[0].tree, GroupTree::Branch(_)));
        assert_eq!(ctx.warnings.len(), 4);
        assert!(ctx.warnings.report().contains("Incorrect group: injected"));
        assert!(ctx.warnings.report().contains("Incorrect group: spaced"));
    }

    #[test]
    fn test_root_not_object() {
        let (games, ctx) = run(r#"[1, 2]"#);
        assert!(games.is_empty());
        assert_eq!(ctx.warnings.len(), 1);
    }
}
