//! Inventory of the applications installed on an Android device.
//!
//! Packages come from a [`inventory::PackageRegistry`]: a device reached over adb or a
//! JSON snapshot. [`inventory::list_installed_apps`] turns them into sorted
//! [`inventory::ApplicationRecord`]s carrying signing-certificate digests, and
//! [`store::AppListStore`] keeps the latest snapshot with a debounced search over it.

pub mod adb;
pub mod core;
pub mod inventory;
pub mod store;
pub mod ui;
