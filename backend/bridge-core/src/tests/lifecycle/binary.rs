use crate::error::LaunchError;
use crate::lifecycle::{BinaryCatalog, Platform};

use std::path::Path;

#[test]
fn given_supported_platforms_when_resolved_then_each_maps_to_its_binary() {
    let catalog = BinaryCatalog::new();
    let cases = [
        ("linux", "x86_64", "neutralino-linux_x64"),
        ("linux", "aarch64", "neutralino-linux_arm64"),
        ("linux", "arm", "neutralino-linux_armhf"),
        ("macos", "x86_64", "neutralino-mac_x64"),
        ("macos", "aarch64", "neutralino-mac_arm64"),
        ("windows", "x86_64", "neutralino-win_x64.exe"),
    ];

    for (os, arch, name) in cases {
        let path = catalog
            .resolve(Path::new("bin"), &Platform::new(os, arch))
            .unwrap();
        assert_eq!(path, Path::new("bin").join(name), "{os}_{arch}");
    }
}

/// **VALUE**: An unknown platform is a configuration error naming os and arch.
///
/// **WHY THIS MATTERS**: This is the only fatal launch outcome that a user can fix
/// without code changes (by shipping the right binary), so the message must say which.
#[test]
fn given_unsupported_platform_when_resolved_then_returns_unsupported_platform_error() {
    let catalog = BinaryCatalog::new();

    let result = catalog.resolve(Path::new("bin"), &Platform::new("freebsd", "x86_64"));

    match result {
        Err(LaunchError::UnsupportedPlatform { os, arch, .. }) => {
            assert_eq!(os, "freebsd");
            assert_eq!(arch, "x86_64");
        }
        other => panic!("expected UnsupportedPlatform, got {other:?}"),
    }
}

#[test]
fn given_custom_entry_when_resolved_then_replaces_default() {
    let catalog =
        BinaryCatalog::new().with_entry(Platform::new("linux", "x86_64"), "my-native-build");

    assert_eq!(
        catalog.binary_name(&Platform::new("linux", "x86_64")),
        Some("my-native-build")
    );
    assert_eq!(
        catalog.binary_name(&Platform::new("windows", "x86_64")),
        Some("neutralino-win_x64.exe")
    );
}

#[test]
fn given_current_platform_when_created_then_matches_std_consts() {
    let platform = Platform::current();

    assert_eq!(platform.os, std::env::consts::OS);
    assert_eq!(platform.arch, std::env::consts::ARCH);
}
