//! Arena scope demo
//!
//! Bootstraps a project scope from a template, spawns a level through the
//! injected node factory, lets the level spawn enemies wired to its arena,
//! then tears everything down again.

mod scopes;

use nested_di::config::ConfigError;
use nested_di::foundation::logging;
use nested_di::prelude::*;
use scopes::{Arena, EnemyScope, Hud, LevelConfig, ScoreBoard};
use thiserror::Error;

const SETTINGS_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/scope_demo.toml");

#[derive(Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Di(#[from] DiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Demo step failed: {0}")]
    Step(&'static str),
}

fn main() -> Result<(), DemoError> {
    let mut settings = ContainerSettings::load_or_default(SETTINGS_PATH)?;
    logging::init_from_settings(&settings);
    if settings.root_template.is_none() {
        settings.root_template = Some("project".to_string());
    }

    log::info!("Starting scope demo");

    let mut tree = SceneTree::new();
    scopes::register_templates(tree.templates_mut());
    let mut container = Container::new(settings);

    let project = container.bootstrap(&mut tree)?.ok_or(DemoError::Step("bootstrap"))?;
    let project_scope = container.scope_of(project).ok_or(DemoError::Step("project scope"))?;

    // Level spawned through the factory the project binds
    let factory = container.factory(project_scope)?;
    let level = factory
        .instantiate(
            &mut container,
            &mut tree,
            project_scope,
            "level",
            project,
            Some(ScopeConfig::new(LevelConfig { waves: 3 })),
        )?
        .ok_or(DemoError::Step("level"))?;
    let level_scope = container.scope_of(level).ok_or(DemoError::Step("level scope"))?;

    let arena = container.resolve::<Arena>(level_scope)?;
    for wave in 0..arena.waves {
        let spawner = container.factory(level_scope)?;
        let bounty = ScopeConfig::new(10 * (wave + 1));
        spawner.instantiate(&mut container, &mut tree, level_scope, "enemy", level, Some(bounty))?;
    }
    let stray = container.instantiate_scope::<EnemyScope>(&mut tree, level_scope, "enemy", level, None)?;
    log::info!("Typed enemy spawn on a pivot template: {:?}", stray);

    let score = container.resolve::<dyn ScoreBoard>(level_scope)?;
    log::info!(
        "Arena '{}' spawned {} enemies, score {}",
        arena.name,
        arena.spawned.get(),
        score.total()
    );
    if let Some(hud_node) = tree.find("hud") {
        if let Some(hud_scope) = container.scope_of(hud_node) {
            let hud = container.resolve::<Hud>(hud_scope)?;
            for line in hud.lines.borrow().iter() {
                log::info!("HUD: {}", line);
            }
        }
    }
    log::info!(
        "{} scopes live, {} bindings",
        container.live_scopes(),
        container.binding_count()
    );

    container.detach(&mut tree, level)?;
    log::info!(
        "Level removed: {} scopes live, {} bindings",
        container.live_scopes(),
        container.binding_count()
    );

    container.detach(&mut tree, project)?;
    log::info!("Project removed, root installed: {}", container.root().is_some());

    Ok(())
}
