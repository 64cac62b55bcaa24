//! Display metadata for error categories.
//!
//! Categories are open strings taken from the data; anything not listed here
//! resolves to the `unknown` entry.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryInfo {
  pub id: &'static str,
  pub title: &'static str,
  pub description: &'static str,
  pub icon: &'static str,
  pub color: &'static str,
  pub severity: &'static str,
}

const KNOWN: &[CategoryInfo] = &[
  CategoryInfo {
    id: "runtime",
    title: "Runtime & Execution",
    description: "Pod lifecycle, container crashes, resource limits and application runtime failures",
    icon: "activity",
    color: "orange",
    severity: "critical",
  },
  CategoryInfo {
    id: "network",
    title: "Network & Connectivity",
    description: "DNS resolution, service communication, ingress and cluster networking",
    icon: "network",
    color: "cyan",
    severity: "high",
  },
  CategoryInfo {
    id: "config",
    title: "Configuration",
    description: "ConfigMap, Secret, YAML validation and configuration-related startup failures",
    icon: "settings",
    color: "purple",
    severity: "medium",
  },
  CategoryInfo {
    id: "auth",
    title: "Authentication & Authorization",
    description: "RBAC, certificates and permission-related access failures",
    icon: "shield",
    color: "yellow",
    severity: "critical",
  },
  CategoryInfo {
    id: "scheduler",
    title: "Scheduling & Resources",
    description: "Pod scheduling failures, resource constraints, affinity and placement",
    icon: "grid",
    color: "blue",
    severity: "high",
  },
  CategoryInfo {
    id: "scheduling",
    title: "Scheduling & Resources",
    description: "Pod scheduling failures, resource constraints, affinity and placement",
    icon: "grid",
    color: "blue",
    severity: "high",
  },
  CategoryInfo {
    id: "cluster",
    title: "Cluster Management",
    description: "Node problems, cluster-wide issues and infrastructure-level failures",
    icon: "server",
    color: "slate",
    severity: "critical",
  },
  CategoryInfo {
    id: "storage",
    title: "Storage & Volumes",
    description: "Persistent volume claims, storage classes and volume mounting errors",
    icon: "hard-drive",
    color: "green",
    severity: "high",
  },
  CategoryInfo {
    id: "registry",
    title: "Image Registry",
    description: "Image pulls, registry authentication and missing tags",
    icon: "package",
    color: "red",
    severity: "high",
  },
];

const UNKNOWN: CategoryInfo = CategoryInfo {
  id: "unknown",
  title: "Other",
  description: "Errors without a recognized category",
  icon: "help-circle",
  color: "gray",
  severity: "medium",
};

/// Look up display metadata; case-insensitive, `unknown` when not listed.
pub fn category_info(id: &str) -> CategoryInfo {
  let id = id.trim();
  KNOWN
    .iter()
    .find(|c| c.id.eq_ignore_ascii_case(id))
    .copied()
    .unwrap_or(UNKNOWN)
}

/// Whether the category has its own metadata entry.
pub fn is_known(id: &str) -> bool {
  category_info(id).id != UNKNOWN.id
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_category_lookup() {
    let info = category_info("runtime");
    assert_eq!(info.title, "Runtime & Execution");
    assert_eq!(category_info("Network").id, "network");
    assert!(is_known("registry"));
  }

  #[test]
  fn unrecognized_category_falls_back() {
    let info = category_info("quantum");
    assert_eq!(info.id, "unknown");
    assert_eq!(info.color, "gray");
    assert!(!is_known("quantum"));
    assert!(!is_known(""));
  }
}
