use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;

use hair_strands::camera::{handle_orbit_input, update_orbit_camera};
use hair_strands::loading::{scalp_status, ScalpStatus};
use hair_strands::{
    cylinder_mesh, line_mesh, surface_from_mesh, DebugFlags, Hair, HairConfigAsset,
    HairConfigLoader, HairLine, MeshConversionError, OrbitControls, ScalpSource,
};

#[derive(Debug)]
enum Stage {
    WaitingForConfig,
    LoadingScalp(ScalpSource),
    Grow(Entity),
    Running,
    Failed,
}

#[derive(Resource)]
struct HairScene {
    config: Handle<HairConfigAsset>,
    stage: Stage,
    seed: u64,
}

fn main() {
    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    canvas: Some("#bevy".into()),
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                meta_check: AssetMetaCheck::Never,
                ..default()
            }),
    )
    .init_asset::<HairConfigAsset>()
    .register_asset_loader(HairConfigLoader)
    .insert_resource(ClearColor(Color::srgb(0.75, 0.75, 0.72)))
    .init_resource::<DebugFlags>()
    .add_systems(Startup, setup)
    .add_systems(
        Update,
        (
            handle_input,
            handle_orbit_input,
            update_orbit_camera,
            load_scalp,
            grow_hair,
            simulate_hair,
            visual_debug,
        )
            .chain(),
    )
    .run();
}

fn setup(mut commands: Commands, server: Res<AssetServer>) {
    let config: Handle<HairConfigAsset> = server.load("hair_config.toml");
    commands.insert_resource(HairScene {
        config,
        stage: Stage::WaitingForConfig,
        seed: 0,
    });
    commands.spawn((
        DirectionalLight::default(),
        Transform::from_xyz(2., 4., 3.).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn handle_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut scene: ResMut<HairScene>,
    mut flags: ResMut<DebugFlags>,
    scalps: Query<Entity, With<Hair>>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        if let Ok(scalp) = scalps.get_single() {
            scene.seed += 1;
            scene.stage = Stage::Grow(scalp);
        }
    }
    if keyboard.just_pressed(KeyCode::KeyR) {
        flags.roots ^= true;
    }
    if keyboard.just_pressed(KeyCode::KeyS) {
        flags.strands ^= true;
    }
    if keyboard.just_pressed(KeyCode::KeyD) {
        flags.chains ^= true;
    }
}

fn load_scalp(
    mut commands: Commands,
    mut scene: ResMut<HairScene>,
    configs: Res<Assets<HairConfigAsset>>,
    server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let scene = &mut *scene;
    let next = match &scene.stage {
        Stage::WaitingForConfig => {
            let Some(config) = configs.get(&scene.config) else {
                return;
            };
            commands.spawn((
                Camera3d::default(),
                bevy::core_pipeline::tonemapping::Tonemapping::None,
                OrbitControls::new(config.camera),
            ));
            scene.seed = config.sampling.seed;
            Stage::LoadingScalp(match &config.render.scalp_model {
                Some(path) => ScalpSource::model(&server, path),
                None => ScalpSource::builtin(&mut meshes),
            })
        }
        Stage::LoadingScalp(source) => match scalp_status(source, &server, &meshes) {
            ScalpStatus::Pending => return,
            ScalpStatus::Failed => Stage::Failed,
            ScalpStatus::Ready => {
                let scalp = commands
                    .spawn((
                        Mesh3d(source.handle().clone()),
                        MeshMaterial3d(materials.add(Color::srgb(0.85, 0.7, 0.6))),
                    ))
                    .id();
                Stage::Grow(scalp)
            }
        },
        _ => return,
    };
    scene.stage = next;
}

fn grow_hair(
    mut commands: Commands,
    mut scene: ResMut<HairScene>,
    configs: Res<Assets<HairConfigAsset>>,
    scalps: Query<&Mesh3d>,
    old_lines: Query<Entity, With<HairLine>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Stage::Grow(scalp) = scene.stage else {
        return;
    };
    let (Some(config), Ok(Mesh3d(handle))) = (configs.get(&scene.config), scalps.get(scalp)) else {
        return;
    };
    let Some(mesh) = meshes.get(handle) else {
        return;
    };

    let hair = surface_from_mesh(mesh)
        .and_then(|surface| {
            Hair::grow(surface, config, scene.seed).map_err(MeshConversionError::from)
        });
    let mut hair = match hair {
        Ok(hair) => hair,
        Err(e) => {
            error!("could not grow hair: {e}");
            scene.stage = Stage::Failed;
            return;
        }
    };

    for e in &old_lines {
        commands.entity(e).despawn_recursive();
    }

    let [r, g, b, a] = config.style.color;
    // one material for every strand
    let material = materials.add(StandardMaterial {
        base_color: Color::srgba(r, g, b, a),
        unlit: true,
        ..default()
    });

    let mut children = Vec::new();
    if config.render.cylinders {
        match hair.cylinders(config) {
            Ok(cylinders) => {
                for c in &cylinders {
                    let mesh = meshes.add(cylinder_mesh(c));
                    let line = commands.spawn((Mesh3d(mesh), MeshMaterial3d(material.clone()), HairLine));
                    children.push(line.id());
                }
            }
            Err(e) => warn!("no strand cylinders: {e}"),
        }
    } else {
        for simulator in &hair.simulation.simulators {
            let mesh = meshes.add(line_mesh(simulator.geometry()));
            hair.line_meshes.push(mesh.clone());
            let line = commands.spawn((Mesh3d(mesh), MeshMaterial3d(material.clone()), HairLine));
            children.push(line.id());
        }
    }

    commands.entity(scalp).add_children(&children).insert(hair);
    scene.stage = Stage::Running;
}

fn simulate_hair(
    scene: Res<HairScene>,
    configs: Res<Assets<HairConfigAsset>>,
    mut hairs: Query<&mut Hair>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    let Some(config) = configs.get(&scene.config) else {
        return;
    };
    if config.render.cylinders {
        return;
    }
    for mut hair in &mut hairs {
        hair.step(&mut meshes);
    }
}

fn visual_debug(hairs: Query<&Hair>, flags: Res<DebugFlags>, mut gizmos: Gizmos) {
    for hair in &hairs {
        hair.debug(&mut gizmos, *flags);
    }
}
