use bevy::asset::{io::Reader, AssetLoader, AsyncReadExt, LoadContext, LoadState};
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;
use strand_core::{HairConfig, HairError};

#[derive(Asset, TypePath, Debug, Clone, Deref)]
pub struct HairConfigAsset(pub HairConfig);

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not read hair config: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Hair(#[from] HairError),
}

#[derive(Default)]
pub struct HairConfigLoader;

impl AssetLoader for HairConfigLoader {
    type Asset = HairConfigAsset;

    type Settings = ();

    type Error = LoadError;

    fn load(
        &self,
        reader: &mut dyn Reader,
        _: &Self::Settings,
        _: &mut LoadContext,
    ) -> impl bevy::utils::ConditionalSendFuture<Output = Result<Self::Asset, Self::Error>> {
        async move {
            let mut content = String::new();
            reader.read_to_string(&mut content).await?;
            Ok(HairConfigAsset(HairConfig::from_toml_str(&content)?))
        }
    }

    fn extensions(&self) -> &[&str] {
        &["toml"]
    }
}

/// Where the scalp mesh comes from, and how far its loading went.
#[derive(Debug, Clone)]
pub enum ScalpSource {
    Builtin(Handle<Mesh>),
    Model(Handle<Mesh>),
}

impl ScalpSource {
    /// First primitive of the first mesh of a glTF file.
    pub fn model(server: &AssetServer, path: &str) -> Self {
        info!("loading scalp model {path}");
        let label = GltfAssetLabel::Primitive {
            mesh: 0,
            primitive: 0,
        };
        Self::Model(server.load(label.from_asset(path.to_owned())))
    }

    pub fn builtin(meshes: &mut Assets<Mesh>) -> Self {
        Self::Builtin(meshes.add(Sphere::new(1.).mesh().uv(32, 18)))
    }

    pub fn handle(&self) -> &Handle<Mesh> {
        match self {
            Self::Builtin(h) | Self::Model(h) => h,
        }
    }
}

#[derive(Debug)]
pub enum ScalpStatus {
    Pending,
    Ready,
    Failed,
}

/// Checks a scalp load without retrying; a failed load is reported once by the caller.
pub fn scalp_status(
    source: &ScalpSource,
    server: &AssetServer,
    meshes: &Assets<Mesh>,
) -> ScalpStatus {
    if meshes.contains(source.handle()) {
        return ScalpStatus::Ready;
    }
    match source {
        ScalpSource::Builtin(_) => ScalpStatus::Failed,
        ScalpSource::Model(handle) => {
            // a missing file fails the glTF root, not always the labeled primitive
            let root = handle
                .path()
                .and_then(|path| server.get_path_id(path.without_label()));
            let states = server
                .get_load_state(handle)
                .into_iter()
                .chain(root.and_then(|id| server.get_load_state(id)));
            for state in states {
                if let LoadState::Failed(err) = state {
                    error!("failed to load scalp model: {err}");
                    return ScalpStatus::Failed;
                }
            }
            ScalpStatus::Pending
        }
    }
}
