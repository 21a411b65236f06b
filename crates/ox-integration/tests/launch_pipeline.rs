//! End-to-end tests for provisioning, validation and engine start

use ox_core::config::{Config, CoreVariant, EngineOptionEntry, ShaderPreset};
use ox_core::error::{EngineError, InspectError, LauncherError, ValidationError};
use ox_input::mapping::{key_action, keycode};
use ox_input::motion::{axis, motion_action};
use ox_input::{ButtonAction, InputSource, MotionSample};
use ox_integration::{
    schedule_start, EmulationEngine, EngineLaunchConfig, EngineSession, Launcher, SessionState,
    UiDispatcher,
};
use ox_loader::{ElfClass, Endianness};
use ox_vfs::{ArchitectureTag, BundleDirectory, MemoryResources, StaticHost};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Little-endian AArch64 shared object header, padded
fn aarch64_core() -> Vec<u8> {
    let mut data = vec![
        0x7F, 0x45, 0x4C, 0x46, 0x02, 0x01, 0x01, 0x00, //
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
        0x03, 0x00, 0xB7, 0x00, 0x01, 0x00, 0x00, 0x00,
    ];
    data.resize(4096, 0);
    data
}

fn nes_rom() -> Vec<u8> {
    let mut data = b"NES\x1A\x02\x01\x01\x00".to_vec();
    data.resize(16 + 2 * 0x4000 + 0x2000, 0xEA);
    data
}

fn test_config(private_dir: &Path) -> Config {
    let mut config = Config::default();
    config.paths.private_dir = private_dir.to_path_buf();
    config.assets.core_variants = vec![
        CoreVariant {
            abi: "arm64-v8a".to_string(),
            resource: "core_arm64".to_string(),
        },
        CoreVariant {
            abi: "armeabi-v7a".to_string(),
            resource: "core_armv7".to_string(),
        },
    ];
    config.engine.shader = ShaderPreset::Crt;
    config.engine.options = vec![
        EngineOptionEntry {
            key: "video_smooth".to_string(),
            value: "false".to_string(),
        },
        EngineOptionEntry {
            key: "video_smooth".to_string(),
            value: "true".to_string(),
        },
    ];
    config.debug.capture_diagnostics = true;
    config
}

fn resources() -> MemoryResources {
    let mut resources = MemoryResources::new();
    resources.insert("core_arm64", aarch64_core());
    resources.insert("core_armv7", b"PK\x03\x04 this is an archive, not a native module".to_vec());
    resources.insert("rom", nes_rom());
    resources
}

fn host(abis: &[&str]) -> StaticHost {
    StaticHost::new(abis.iter().map(|s| s.to_string()).collect())
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Start { core: PathBuf, game: Option<PathBuf> },
    AttachGame(PathBuf),
    Button(ButtonAction, u8),
    Motion(u8, f32, f32),
    Destroy,
}

struct RecordingEngine {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl EmulationEngine for RecordingEngine {
    fn start(&mut self, config: &EngineLaunchConfig) -> Result<(), EngineError> {
        self.calls.lock().push(Call::Start {
            core: config.core_path().to_path_buf(),
            game: config.game_path().map(Path::to_path_buf),
        });
        Ok(())
    }

    fn attach_game(&mut self, path: &Path) -> Result<(), EngineError> {
        self.calls.lock().push(Call::AttachGame(path.to_path_buf()));
        Ok(())
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn destroy(&mut self) {
        self.calls.lock().push(Call::Destroy);
    }

    fn send_button_event(&mut self, action: ButtonAction, index: u8) {
        self.calls.lock().push(Call::Button(action, index));
    }

    fn send_motion_event(&mut self, group: u8, x: f32, y: f32) {
        self.calls.lock().push(Call::Motion(group, x, y));
    }
}

fn start_recording(
    plan: ox_integration::LaunchPlan,
) -> (EngineSession, Arc<Mutex<Vec<Call>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = UiDispatcher::new();
    let engine_calls = calls.clone();
    schedule_start(plan, &dispatcher.handle(), move || {
        Ok(Box::new(RecordingEngine {
            calls: engine_calls,
        }) as Box<dyn EmulationEngine>)
    });

    let mut session = EngineSession::new();
    assert!(!session.is_alive());
    assert_eq!(dispatcher.run_pending(&mut session), 1);
    (session, calls)
}

#[test]
fn test_full_launch() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let dir = TempDir::new().unwrap();
    let launcher = Launcher::new(
        test_config(dir.path()),
        resources(),
        host(&["x86_64", "arm64-v8a", "armeabi-v7a"]),
    );

    let plan = launcher.prepare().unwrap();
    assert_eq!(plan.variant, ArchitectureTag::Arm64V8a);
    assert!(plan.rom_magic_matches);

    // Hand-decoded from aarch64_core(): class 2, data 1, version 1, osabi 0, machine B7 00
    let ident = plan.core.ident();
    assert_eq!(ident.class, ElfClass::Elf64);
    assert_eq!(ident.endianness, Endianness::Little);
    assert_eq!(ident.version, 1);
    assert_eq!(ident.os_abi, 0);
    assert_eq!(ident.machine, 0x00B7);

    assert_eq!(plan.config.shader(), ShaderPreset::Crt);
    assert_eq!(plan.config.option("video_smooth"), Some("true"));
    assert_eq!(plan.config.warnings().len(), 1);

    let core_path = plan.core.path().to_path_buf();
    let rom_path = plan.rom.as_path().to_path_buf();
    assert_eq!(std::fs::read(&rom_path).unwrap(), nes_rom());

    let (mut session, calls) = start_recording(plan);
    assert_eq!(session.state(), SessionState::Running);

    assert!(session.on_key(keycode::BUTTON_A, key_action::DOWN));
    assert!(session.on_key(keycode::BUTTON_A, key_action::UP));
    assert!(!session.on_key(24, key_action::DOWN));

    let idle = MotionSample::new(InputSource::JOYSTICK, motion_action::MOVE);
    assert!(session.on_motion(&idle));
    let hat_right = MotionSample::new(InputSource::JOYSTICK, motion_action::MOVE)
        .with_axis(axis::HAT_X, 1.0);
    assert!(session.on_motion(&hat_right));

    session.destroy();

    let calls = calls.lock().clone();
    assert_eq!(
        calls,
        vec![
            Call::Start {
                core: core_path,
                game: Some(rom_path),
            },
            Call::Button(ButtonAction::Press, 1),
            Call::Button(ButtonAction::Release, 1),
            Call::Motion(0, 0.0, 0.0),
            Call::Motion(1, 0.0, 0.0),
            Call::Motion(0, 0.0, 0.0),
            Call::Motion(1, 0.0, 0.0),
            Call::Motion(2, 1.0, 0.0),
            Call::Destroy,
        ]
    );
}

#[test]
fn test_prepare_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let launcher = Launcher::new(test_config(dir.path()), resources(), host(&["arm64-v8a"]));

    let first = launcher.prepare().unwrap();
    let second = launcher.prepare().unwrap();

    assert_eq!(first.rom, second.rom);
    assert_eq!(first.core.path(), second.core.path());
    let source = launcher.provisioner().source();
    assert_eq!(source.open_count("core_arm64"), 1);
    assert_eq!(source.open_count("rom"), 1);
}

#[test]
fn test_unsupported_architecture() {
    let dir = TempDir::new().unwrap();
    let launcher = Launcher::new(test_config(dir.path()), resources(), host(&["x86_64", "mips"]));

    let err = launcher.prepare().unwrap_err();
    match err {
        LauncherError::UnsupportedArchitecture(e) => {
            assert_eq!(e.host, vec!["x86_64".to_string(), "mips".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dir.path().join("core_libretro_android.so").exists());
}

#[test]
fn test_non_elf_core_is_rejected() {
    let dir = TempDir::new().unwrap();
    let launcher = Launcher::new(test_config(dir.path()), resources(), host(&["armeabi-v7a"]));

    let err = launcher.prepare().unwrap_err();
    assert!(matches!(
        err,
        LauncherError::Validation(ValidationError::BadMagic { .. })
    ));
    assert!(!dir.path().join("core_libretro_android.so").exists());
}

#[test]
fn test_rejected_core_is_recopied_from_fixed_bundle() {
    let dir = TempDir::new().unwrap();

    let mut broken = resources();
    broken.insert("core_arm64", b"PK\x03\x04 not elf".to_vec());
    let launcher = Launcher::new(test_config(dir.path()), broken, host(&["arm64-v8a"]));
    let err = launcher.prepare().unwrap_err();
    assert!(matches!(
        err,
        LauncherError::Inspect(InspectError::TooShort { actual: 12, .. })
    ));
    assert!(!dir.path().join("core_libretro_android.so").exists());

    let launcher = Launcher::new(test_config(dir.path()), resources(), host(&["arm64-v8a"]));
    let plan = launcher.prepare().unwrap();
    assert_eq!(plan.core.ident().machine, 0x00B7);
    assert_eq!(launcher.provisioner().source().open_count("core_arm64"), 1);
}

#[test]
fn test_short_rom_is_recopied_from_fixed_bundle() {
    let dir = TempDir::new().unwrap();

    let mut broken = resources();
    broken.insert("rom", b"NE".to_vec());
    let launcher = Launcher::new(test_config(dir.path()), broken, host(&["arm64-v8a"]));
    let err = launcher.prepare().unwrap_err();
    assert!(matches!(
        err,
        LauncherError::Inspect(InspectError::TooShort { actual: 2, .. })
    ));
    assert!(!dir.path().join("game.nes").exists());

    let launcher = Launcher::new(test_config(dir.path()), resources(), host(&["arm64-v8a"]));
    let plan = launcher.prepare().unwrap();
    assert!(plan.rom_magic_matches);
    assert_eq!(std::fs::read(plan.rom.as_path()).unwrap(), nes_rom());
}

#[test]
fn test_truncated_rom_never_succeeds() {
    let dir = TempDir::new().unwrap();
    let mut resources = resources();
    let rom = nes_rom();
    resources.insert_with_len("rom", rom[..1024].to_vec(), Some(rom.len() as u64));
    let launcher = Launcher::new(test_config(dir.path()), resources, host(&["arm64-v8a"]));

    let err = launcher.prepare().unwrap_err();
    assert!(matches!(
        err,
        LauncherError::Validation(ValidationError::Truncated { actual: 1024, .. })
    ));
    assert!(!dir.path().join("game.nes").exists());
}

#[test]
fn test_deferred_game_load() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.engine.defer_game_load = true;
    let launcher = Launcher::new(config, resources(), host(&["arm64-v8a"]));

    let plan = launcher.prepare().unwrap();
    assert!(plan.config.game_path().is_none());
    let rom_path = plan.rom.as_path().to_path_buf();

    let (session, calls) = start_recording(plan);
    assert!(session.is_alive());

    let calls = calls.lock().clone();
    assert!(matches!(&calls[0], Call::Start { game: None, .. }));
    assert_eq!(calls[1], Call::AttachGame(rom_path));
}

#[test]
fn test_engine_construction_failure_terminates_session() {
    let dir = TempDir::new().unwrap();
    let launcher = Launcher::new(test_config(dir.path()), resources(), host(&["arm64-v8a"]));
    let plan = launcher.prepare().unwrap();

    let dispatcher = UiDispatcher::new();
    schedule_start(plan, &dispatcher.handle(), || {
        Err(EngineError::Construction("surface unavailable".to_string()))
    });

    let mut session = EngineSession::new();
    dispatcher.run_pending(&mut session);
    assert_eq!(session.state(), SessionState::Terminated);
    assert!(!session.on_key(keycode::BUTTON_START, key_action::DOWN));
}

#[test]
fn test_launch_from_bundle_directory() {
    let bundle = TempDir::new().unwrap();
    std::fs::write(bundle.path().join("core_arm64"), aarch64_core()).unwrap();
    std::fs::write(bundle.path().join("rom"), nes_rom()).unwrap();

    let private = TempDir::new().unwrap();
    let launcher = Launcher::new(
        test_config(private.path()),
        BundleDirectory::new(bundle.path()),
        host(&["arm64-v8a"]),
    );

    let plan = launcher.prepare().unwrap();
    assert!(plan.core.path().starts_with(private.path().canonicalize().unwrap()));
    assert!(plan.rom_magic_matches);
}
