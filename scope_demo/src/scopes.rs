//! Scopes and services wired together by the arena demo

use nested_di::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Project-wide score tracking
pub trait ScoreBoard {
    /// Add points
    fn award(&self, points: u32);
    /// Current total
    fn total(&self) -> u32;
}

/// In-memory score board
#[derive(Default)]
pub struct TallyBoard {
    total: Cell<u32>,
}

impl ScoreBoard for TallyBoard {
    fn award(&self, points: u32) {
        self.total.set(self.total.get() + points);
    }

    fn total(&self) -> u32 {
        self.total.get()
    }
}

/// Per-level state shared with everything spawned into the level
pub struct Arena {
    pub name: String,
    pub waves: u32,
    pub spawned: Cell<u32>,
}

/// Level overlay state, bound by the embedded HUD
#[derive(Default)]
pub struct Hud {
    pub lines: RefCell<Vec<String>>,
}

/// Wave count handed to a level through its config
#[derive(Debug, Clone, Copy)]
pub struct LevelConfig {
    pub waves: u32,
}

/// Level scope: binds the arena
pub struct LevelScope {
    name: String,
    score: Option<Rc<dyn ScoreBoard>>,
}

impl LevelScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: None,
        }
    }
}

impl Scope for LevelScope {
    fn inject(&mut self, resolver: &Resolver<'_>) -> DiResult<()> {
        self.score = Some(resolver.resolve::<dyn ScoreBoard>()?);
        Ok(())
    }

    fn construct(&mut self, binder: &mut DependencyBinder<'_>, config: Option<ScopeConfig>) -> DiResult<()> {
        let waves = ScopeConfig::extract::<LevelConfig>(config).map_or(1, |config| config.waves);
        binder.bind_value(Arena {
            name: self.name.clone(),
            waves,
            spawned: Cell::new(0),
        })?;
        Ok(())
    }

    fn initialize(&mut self, _resolver: &Resolver<'_>) {
        if let Some(score) = &self.score {
            log::info!("Level '{}' ready, score so far {}", self.name, score.total());
        }
    }
}

/// HUD living inside the level subtree
pub struct HudScope;

impl Scope for HudScope {
    fn kind(&self) -> ScopeKind {
        ScopeKind::Embedded
    }

    fn construct(&mut self, binder: &mut DependencyBinder<'_>, _config: Option<ScopeConfig>) -> DiResult<()> {
        binder.bind_value(Hud::default())?;
        Ok(())
    }

    fn initialize(&mut self, resolver: &Resolver<'_>) {
        if let (Some(hud), Some(arena)) = (resolver.try_resolve::<Hud>(), resolver.try_resolve::<Arena>()) {
            hud.lines.borrow_mut().push(format!("{}: {} waves", arena.name, arena.waves));
        }
    }
}

/// Enemy scope: counts itself into the arena and awards points
pub struct EnemyScope {
    arena: Option<Rc<Arena>>,
    score: Option<Rc<dyn ScoreBoard>>,
    bounty: u32,
}

impl EnemyScope {
    pub fn new() -> Self {
        Self {
            arena: None,
            score: None,
            bounty: 10,
        }
    }
}

impl Scope for EnemyScope {
    fn inject(&mut self, resolver: &Resolver<'_>) -> DiResult<()> {
        self.arena = Some(resolver.resolve::<Arena>()?);
        self.score = Some(resolver.resolve::<dyn ScoreBoard>()?);
        Ok(())
    }

    fn construct(&mut self, _binder: &mut DependencyBinder<'_>, config: Option<ScopeConfig>) -> DiResult<()> {
        if let Some(bounty) = ScopeConfig::extract::<u32>(config) {
            self.bounty = bounty;
        }
        Ok(())
    }

    fn initialize(&mut self, _resolver: &Resolver<'_>) {
        if let Some(arena) = &self.arena {
            arena.spawned.set(arena.spawned.get() + 1);
        }
        if let Some(score) = &self.score {
            score.award(self.bounty);
        }
    }
}

/// Register the demo's templates
pub fn register_templates(templates: &mut TemplateLibrary) {
    templates.register("project", |tree: &mut SceneTree| {
        let context = ProjectContext::new().with_installer(|binder| {
            binder.bind::<dyn ScoreBoard>(Rc::new(TallyBoard::default()))
        });
        tree.create_scope_node("project", context)
    });

    templates.register("level", |tree: &mut SceneTree| {
        let level = tree.create_scope_node("level", LevelScope::new("dunes"));
        let overlay = tree.create_node("overlay");
        let hud = tree.create_scope_node("hud", HudScope);
        let _ = tree.add_child(level, overlay);
        let _ = tree.add_child(overlay, hud);
        level
    });

    templates.register("enemy", |tree: &mut SceneTree| {
        let pivot = tree.create_node("enemy_pivot");
        let enemy = tree.create_scope_node("enemy", EnemyScope::new());
        let _ = tree.add_child(pivot, enemy);
        pivot
    });
}
