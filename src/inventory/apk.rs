//! Signer certificates and launcher icons from a raw APK.
//!
//! Certificates are taken from the APK Signing Block (scheme v3, then v2) when
//! present, else from the JAR signature block under `META-INF/`. A v3 signer with
//! a proof-of-rotation lineage yields the lineage instead, oldest certificate first.

use crate::core::{AdbError, Result};
use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

const EOCD_MAGIC: u32 = 0x0605_4b50;
const EOCD_MIN_LEN: usize = 22;
const SIG_BLOCK_MAGIC: &[u8; 16] = b"APK Sig Block 42";
const SCHEME_V2_ID: u32 = 0x7109_871a;
const SCHEME_V3_ID: u32 = 0xf053_68c0;
const PROOF_OF_ROTATION_ID: u32 = 0x3ba0_6f8c;
/// DER body of OID 1.2.840.113549.1.7.2 (pkcs7-signedData).
const OID_SIGNED_DATA: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x07, 0x02];

#[derive(Debug, Default)]
pub struct ApkContents {
    pub certificates: Vec<Vec<u8>>,
    pub icon: Option<Vec<u8>>,
}

pub fn inspect(apk: &[u8]) -> Result<ApkContents> {
    let mut archive = ZipArchive::new(Cursor::new(apk))?;
    let certificates = match signing_block_certificates(apk) {
        Some(certs) if !certs.is_empty() => certs,
        _ => jar_certificates(&mut archive)?,
    };
    let icon = launcher_icon(&mut archive).unwrap_or_else(|e| {
        debug!("unreadable launcher icon: {}", e);
        None
    });
    Ok(ApkContents { certificates, icon })
}

fn le_u32(buf: &[u8], at: usize) -> Option<u32> {
    let b = buf.get(at..at.checked_add(4)?)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn le_u64(buf: &[u8], at: usize) -> Option<u64> {
    let b = buf.get(at..at.checked_add(8)?)?;
    let mut arr = [0u8; 8];
    arr.copy_from_slice(b);
    Some(u64::from_le_bytes(arr))
}

/// Splits a u32-length-prefixed slice off the front of `buf`.
fn take_prefixed(buf: &[u8]) -> Option<(&[u8], &[u8])> {
    let len = le_u32(buf, 0)? as usize;
    let body = buf.get(4..4usize.checked_add(len)?)?;
    Some((body, &buf[4 + len..]))
}

fn central_directory_offset(apk: &[u8]) -> Option<usize> {
    if apk.len() < EOCD_MIN_LEN {
        return None;
    }
    let lowest = apk.len().saturating_sub(EOCD_MIN_LEN + u16::MAX as usize);
    (lowest..=apk.len() - EOCD_MIN_LEN)
        .rev()
        .find(|&i| le_u32(apk, i) == Some(EOCD_MAGIC))
        .and_then(|eocd| le_u32(apk, eocd + 16))
        .map(|off| off as usize)
}

fn signing_block_pairs(apk: &[u8]) -> Option<&[u8]> {
    let cd = central_directory_offset(apk)?;
    let magic_at = cd.checked_sub(16)?;
    if apk.get(magic_at..cd)? != SIG_BLOCK_MAGIC {
        return None;
    }
    let size = le_u64(apk, cd.checked_sub(24)?)? as usize;
    let start = cd.checked_sub(size.checked_add(8)?)?;
    apk.get(start + 8..cd - 24)
}

fn scheme_value(pairs: &[u8], wanted: u32) -> Option<&[u8]> {
    let mut rest = pairs;
    while rest.len() >= 12 {
        let len = le_u64(rest, 0)? as usize;
        let pair = rest.get(8..8usize.checked_add(len)?)?;
        if le_u32(pair, 0)? == wanted {
            return pair.get(4..);
        }
        rest = &rest[8 + len..];
    }
    None
}

/// First signer's certificates from a v3 or v2 signature scheme block.
fn signing_block_certificates(apk: &[u8]) -> Option<Vec<Vec<u8>>> {
    let pairs = signing_block_pairs(apk)?;
    if let Some(value) = scheme_value(pairs, SCHEME_V3_ID) {
        let (_digests, rest) = take_prefixed(first_signed_data(value)?)?;
        let (certs, rest) = take_prefixed(rest)?;
        // minSdk and maxSdk sit between the certificates and the attributes.
        let lineage = rest
            .get(8..)
            .and_then(take_prefixed)
            .and_then(|(attrs, _)| rotation_lineage(attrs));
        return match lineage {
            Some(lineage) if !lineage.is_empty() => Some(lineage),
            _ => prefixed_list(certs),
        };
    }
    let value = scheme_value(pairs, SCHEME_V2_ID)?;
    let (_digests, rest) = take_prefixed(first_signed_data(value)?)?;
    let (certs, _) = take_prefixed(rest)?;
    prefixed_list(certs)
}

fn first_signed_data(value: &[u8]) -> Option<&[u8]> {
    let (signers, _) = take_prefixed(value)?;
    let (signer, _) = take_prefixed(signers)?;
    take_prefixed(signer).map(|(signed_data, _)| signed_data)
}

fn prefixed_list(mut buf: &[u8]) -> Option<Vec<Vec<u8>>> {
    let mut out = Vec::new();
    while !buf.is_empty() {
        let (item, next) = take_prefixed(buf)?;
        out.push(item.to_vec());
        buf = next;
    }
    Some(out)
}

/// Certificates of the proof-of-rotation attribute, oldest first.
fn rotation_lineage(mut attrs: &[u8]) -> Option<Vec<Vec<u8>>> {
    while !attrs.is_empty() {
        let (attr, next) = take_prefixed(attrs)?;
        attrs = next;
        if le_u32(attr, 0)? != PROOF_OF_ROTATION_ID {
            continue;
        }
        // Attribute id, then a u32 lineage version, then the levels.
        let mut levels = attr.get(8..)?;
        let mut certs = Vec::new();
        while !levels.is_empty() {
            let (level, next) = take_prefixed(levels)?;
            let (signed, _) = take_prefixed(level)?;
            let (cert, _) = take_prefixed(signed)?;
            certs.push(cert.to_vec());
            levels = next;
        }
        return Some(certs);
    }
    None
}

fn jar_certificates(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<Vec<Vec<u8>>> {
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|n| is_signature_block(n))
        .map(str::to_string)
        .collect();
    names.sort();
    let Some(name) = names.first() else {
        return Ok(Vec::new());
    };
    let mut block = Vec::new();
    archive.by_name(name)?.read_to_end(&mut block)?;
    pkcs7_certificates(&block)
}

fn is_signature_block(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    upper.starts_with("META-INF/")
        && !upper["META-INF/".len()..].contains('/')
        && (upper.ends_with(".RSA") || upper.ends_with(".DSA") || upper.ends_with(".EC"))
}

struct Tlv<'a> {
    tag: u8,
    /// Full encoding, header included.
    raw: &'a [u8],
    content: &'a [u8],
}

fn read_tlv(buf: &[u8]) -> Result<(Tlv<'_>, &[u8])> {
    let bad = |why: &str| AdbError::Parse(format!("DER: {}", why));
    let tag = *buf.first().ok_or_else(|| bad("truncated tag"))?;
    let first = *buf.get(1).ok_or_else(|| bad("truncated length"))?;
    let (len, header) = if first & 0x80 == 0 {
        (first as usize, 2)
    } else {
        let n = (first & 0x7f) as usize;
        if n == 0 || n > 4 {
            return Err(bad("unsupported length form"));
        }
        let bytes = buf.get(2..2 + n).ok_or_else(|| bad("truncated length"))?;
        (bytes.iter().fold(0usize, |acc, b| (acc << 8) | *b as usize), 2 + n)
    };
    let end = header.checked_add(len).ok_or_else(|| bad("length overflow"))?;
    if buf.len() < end {
        return Err(bad("content exceeds buffer"));
    }
    Ok((
        Tlv {
            tag,
            raw: &buf[..end],
            content: &buf[header..end],
        },
        &buf[end..],
    ))
}

fn expect_tlv(buf: &[u8], tag: u8) -> Result<(Tlv<'_>, &[u8])> {
    let (tlv, rest) = read_tlv(buf)?;
    if tlv.tag != tag {
        return Err(AdbError::Parse(format!(
            "DER: expected tag {:#04x}, found {:#04x}",
            tag, tlv.tag
        )));
    }
    Ok((tlv, rest))
}

/// Certificates of a PKCS#7 SignedData blob, each as its full DER encoding.
pub fn pkcs7_certificates(block: &[u8]) -> Result<Vec<Vec<u8>>> {
    let (content_info, _) = expect_tlv(block, 0x30)?;
    let (oid, rest) = expect_tlv(content_info.content, 0x06)?;
    if oid.content != OID_SIGNED_DATA {
        return Err(AdbError::Parse("PKCS#7 content is not signedData".to_string()));
    }
    let (explicit, _) = expect_tlv(rest, 0xa0)?;
    let (signed_data, _) = expect_tlv(explicit.content, 0x30)?;
    let (_version, rest) = expect_tlv(signed_data.content, 0x02)?;
    let (_digest_algorithms, rest) = expect_tlv(rest, 0x31)?;
    let (_encap_content, mut rest) = expect_tlv(rest, 0x30)?;
    let mut certs = Vec::new();
    while !rest.is_empty() {
        let (field, next) = read_tlv(rest)?;
        rest = next;
        if field.tag != 0xa0 {
            continue;
        }
        let mut inner = field.content;
        while !inner.is_empty() {
            let (cert, next) = read_tlv(inner)?;
            if cert.tag == 0x30 {
                certs.push(cert.raw.to_vec());
            }
            inner = next;
        }
        break;
    }
    Ok(certs)
}

/// Largest `ic_launcher*.png` in the archive.
fn launcher_icon(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<Option<Vec<u8>>> {
    let mut best: Option<(u64, usize)> = None;
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        let name = entry.name();
        let file = name.rsplit('/').next().unwrap_or(name);
        if name.starts_with("res/") && file.starts_with("ic_launcher") && file.ends_with(".png") {
            let size = entry.size();
            if best.map_or(true, |(s, _)| size > s) {
                best = Some((size, i));
            }
        }
    }
    match best {
        Some((_, idx)) => {
            let mut buf = Vec::new();
            archive.by_index(idx)?.read_to_end(&mut buf)?;
            Ok(Some(buf))
        }
        None => Ok(None),
    }
}
