#![cfg(unix)]

use appinv::adb::AdbClient;
use appinv::inventory::{
    list_installed_apps, AdbRegistry, AdbRegistryOptions, IconSource, PackageRegistry, Scope,
};
use std::io::{Cursor, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Answers `dumpsys`, `pm path` and `exec-out cat` from files next to the script.
/// `pm path` lists a split before `base.apk`; only `base.apk` exists on disk.
const FAKE_ADB: &str = r#"#!/bin/sh
dir="$(dirname "$0")"
case "$3" in
  shell)
    case "$4" in
      dumpsys) cat "$dir/dumpsys.txt" ;;
      pm)
        echo "package:$dir/$6/split_config.arm64_v8a.apk"
        echo "package:$dir/$6/base.apk"
        ;;
    esac
    ;;
  exec-out) cat "$5" ;;
esac
"#;

const DUMPSYS: &str = "\
Packages:
  Package [org.zeta.notes] (1a2b):
    versionCode=12 minSdk=24 targetSdk=34
    versionName=1.2
    flags=[ HAS_CODE ALLOW_CLEAR_USER_DATA ]
  Package [com.android.phone] (3c4d):
    versionCode=34 minSdk=34 targetSdk=34
    versionName=14
    flags=[ SYSTEM HAS_CODE PERSISTENT ]
  Package [net.alpha.reader] (5e6f):
    versionCode=7 minSdk=21 targetSdk=33
    versionName=0.7
    flags=[ HAS_CODE ]
";

fn fake_adb(dumpsys: &str) -> (TempDir, AdbClient) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("dumpsys.txt"), dumpsys).unwrap();
    let script = dir.path().join("adb");
    std::fs::write(&script, FAKE_ADB).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    let client = AdbClient::new(Some(&script), Duration::from_secs(10)).unwrap();
    (dir, client)
}

fn der(tag: u8, content: &[u8]) -> Vec<u8> {
    assert!(content.len() < 0x80);
    let mut out = vec![tag, content.len() as u8];
    out.extend_from_slice(content);
    out
}

/// JAR-signed APK whose PKCS#7 block carries one certificate, plus a launcher icon.
fn write_apk(root: &Path, package: &str, cert_body: &[u8], icon: &[u8]) -> Vec<u8> {
    let cert = der(0x30, cert_body);
    let signed_data = [
        der(0x02, &[1]),
        der(0x31, &[]),
        der(0x30, &der(0x06, &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x07, 0x01])),
        der(0xa0, &cert),
        der(0x31, &[]),
    ]
    .concat();
    let info = [
        der(0x06, &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x07, 0x02]),
        der(0xa0, &der(0x30, &signed_data)),
    ]
    .concat();
    let block = der(0x30, &info);

    let mut buf = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buf);
        let opts = SimpleFileOptions::default();
        for (name, data) in [
            ("META-INF/CERT.RSA", block.as_slice()),
            ("res/mipmap-xxhdpi-v4/ic_launcher.png", icon),
        ] {
            zip.start_file(name, opts).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }
    let pkg_dir = root.join(package);
    std::fs::create_dir_all(&pkg_dir).unwrap();
    std::fs::write(pkg_dir.join("base.apk"), buf.into_inner()).unwrap();
    cert
}

#[tokio::test]
async fn dumpsys_packages_are_parsed_in_device_order() {
    let (_dir, client) = fake_adb(DUMPSYS);
    let registry = AdbRegistry::new(client, "emulator-5554", AdbRegistryOptions::default());
    let entries: Vec<_> = registry
        .installed_packages()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.unwrap())
        .collect();
    let seen: Vec<_> = entries
        .iter()
        .map(|e| (e.package_name.as_str(), e.version_code, e.is_system))
        .collect();
    assert_eq!(
        seen,
        vec![
            ("org.zeta.notes", 12, false),
            ("com.android.phone", 34, true),
            ("net.alpha.reader", 7, false),
        ]
    );
    assert!(entries.iter().all(|e| e.certificates.is_empty()));
}

#[tokio::test]
async fn permission_denial_yields_empty_inventory() {
    let (_dir, client) = fake_adb(
        "Permission Denial: can't dump PackageManager from pid=123, uid=2000\n",
    );
    let registry = AdbRegistry::new(client, "emulator-5554", AdbRegistryOptions::default());
    let err = registry.installed_packages().await.unwrap_err();
    assert!(matches!(err, appinv::core::AdbError::PermissionDenied(_)));
    assert!(list_installed_apps(&registry, Scope::All).await.is_empty());
}

#[tokio::test]
async fn certificate_fetch_reads_base_apk_and_keeps_order() {
    let (dir, client) = fake_adb(DUMPSYS);
    let zeta = write_apk(dir.path(), "org.zeta.notes", b"zeta-cert", b"zeta-icon");
    let alpha = write_apk(dir.path(), "net.alpha.reader", b"alpha-cert", b"alpha-icon");
    let options = AdbRegistryOptions {
        fetch_certificates: true,
        fetch_concurrency: 2,
    };
    let registry = AdbRegistry::new(client, "emulator-5554", options);
    let entries: Vec<_> = registry
        .installed_packages()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.unwrap())
        .collect();

    let names: Vec<_> = entries.iter().map(|e| e.package_name.as_str()).collect();
    assert_eq!(names, vec!["org.zeta.notes", "com.android.phone", "net.alpha.reader"]);
    assert_eq!(entries[0].certificates, vec![zeta]);
    assert_eq!(entries[0].icon, IconSource::Inline(b"zeta-icon".to_vec()));
    // No APK on disk: the package stays, without certificates or icon.
    assert!(entries[1].certificates.is_empty());
    assert_eq!(entries[1].icon, IconSource::None);
    assert_eq!(entries[2].certificates, vec![alpha]);

    let apps = list_installed_apps(&registry, Scope::UserOnly).await;
    let reader = apps.iter().find(|a| a.package_name == "net.alpha.reader").unwrap();
    assert_ne!(reader.sha256_signature, appinv::inventory::models::UNKNOWN);
    assert_eq!(apps.len(), 2);
}
