//! The functional core: document tree in, read-only project for the writers out.
pub mod context;
pub mod group;
pub mod projector;
pub mod schema;

pub use context::GenContext;

use std::collections::{HashMap, HashSet};

use crate::model::{Game, Group, NAMESPACE_RESERVED, ROOT_RESERVED, Section};
use crate::parser::Node;
use projector::Projections;

/// A game as the emitter sees it. Projections exist only for real games that
/// own their namespace, and only those get section tables.
#[derive(Debug)]
pub struct ProcessedGame {
    pub name: String,
    pub namespace: String,
    pub sections: Vec<Section>,
    pub projections: Option<Projections>,
    pub groups: Vec<Group>,
}

impl ProcessedGame {
    pub fn is_real(&self) -> bool {
        !self.namespace.is_empty()
    }
}

/// Fully processed output handed to `writer`.
#[derive(Debug)]
pub struct ProcessedProject {
    pub games: Vec<ProcessedGame>,
    pub ctx: GenContext,
}

/// Runs every processing pass. Never fails; problems land in `ctx.warnings`.
pub fn run(root: &Node) -> ProcessedProject {
    let mut ctx = GenContext::new();
    let games = schema::walk(root, &mut ctx);
    log::info!(
        "Walked {} games, {} glossary items",
        games.len(),
        ctx.glossary.len()
    );

    let mut scopes = Scopes::new(&games, &ctx);
    let games = games
        .into_iter()
        .map(|game| process_game(game, &mut scopes, &mut ctx))
        .collect();

    ProcessedProject { games, ctx }
}

/// Names already declared in each emitted C++ namespace, `""` being the root.
struct Scopes {
    base: HashSet<String>,
    owners: HashMap<String, String>,
    taken: HashMap<String, HashSet<String>>,
}

impl Scopes {
    fn new(games: &[Game], ctx: &GenContext) -> Self {
        // Glossary enumerators are visible from every namespace.
        let base: HashSet<String> = ctx.glossary.keys().cloned().collect();
        let mut root = base.clone();
        root.extend(ROOT_RESERVED.iter().map(|s| s.to_string()));
        root.extend(games.iter().filter(|g| g.is_real()).map(|g| g.namespace.clone()));

        Scopes {
            base,
            owners: HashMap::new(),
            taken: HashMap::from([(String::new(), root)]),
        }
    }

    /// Claims `game.namespace` for its sections, or names the game that got it first.
    fn claim_namespace(&mut self, game: &Game) -> Result<(), String> {
        if let Some(owner) = self.owners.get(&game.namespace) {
            return Err(owner.clone());
        }
        self.owners.insert(game.namespace.clone(), game.name.clone());

        let mut names = self.base.clone();
        names.extend(NAMESPACE_RESERVED.iter().map(|s| s.to_string()));
        names.extend(game.sections.iter().map(|s| s.name.clone()));
        self.taken.insert(game.namespace.clone(), names);
        Ok(())
    }

    fn claim(&mut self, namespace: &str, name: &str) -> bool {
        self.taken
            .entry(namespace.to_owned())
            .or_insert_with(|| self.base.clone())
            .insert(name.to_owned())
    }
}

fn process_game(mut game: Game, scopes: &mut Scopes, ctx: &mut GenContext) -> ProcessedGame {
    let mut projections = None;
    if game.is_real() {
        match scopes.claim_namespace(&game) {
            Ok(()) => projections = Some(projector::project(&game.name, &game.sections, ctx)),
            Err(owner) => {
                ctx.warn(format!(
                    "Warning: In game \"{}\": Namespace \"{}\" already holds the sections of game \"{owner}\", omitting sections.",
                    game.name, game.namespace
                ));
                game.sections.clear();
            }
        }
    }

    game.groups.retain(|g| {
        let fresh = scopes.claim(&game.namespace, &g.name);
        if !fresh {
            let scope = if game.namespace.is_empty() {
                "the root namespace".to_owned()
            } else {
                format!("namespace \"{}\"", game.namespace)
            };
            ctx.warn(format!(
                "Warning: In game \"{}\": Group name \"{}\" is already declared in {scope}, ignoring.",
                game.name, g.name
            ));
        }
        fresh
    });

    ProcessedGame {
        name: game.name,
        namespace: game.namespace,
        sections: game.sections,
        projections,
        groups: game.groups,
    }
}
