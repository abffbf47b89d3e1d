//! 菜单 / 商品目录
//!
//! 只读查找表，启动时加载一次，以 `Arc<Catalog>` 显式注入需要做名称解析的工具。
//! 口语里的商品名按固定策略匹配：精确 → 前缀 → 子串 → NoMatch。

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate catalog id: {0}")]
    DuplicateId(String),

    /// 名称规范化后为空（如 "!!"），无法参与名称解析
    #[error("Catalog item {0} has no usable name")]
    EmptyName(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// 名称解析结果，带命中层级
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogMatch<'a> {
    Exact(&'a CatalogItem),
    Prefix(&'a CatalogItem),
    Substring(&'a CatalogItem),
    NoMatch,
}

impl<'a> CatalogMatch<'a> {
    pub fn item(&self) -> Option<&'a CatalogItem> {
        match self {
            Self::Exact(item) | Self::Prefix(item) | Self::Substring(item) => Some(item),
            Self::NoMatch => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    /// 规范化名称 → items 下标
    by_key: HashMap<String, usize>,
    by_id: HashMap<String, usize>,
}

/// 规范化：小写，去掉标点，空白折叠为单个空格
pub fn normalize_key(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Result<Self, CatalogError> {
        let mut by_key = HashMap::new();
        let mut by_id = HashMap::new();
        for (idx, item) in items.iter().enumerate() {
            if by_id.insert(item.id.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
            let key = normalize_key(&item.name);
            if key.is_empty() {
                return Err(CatalogError::EmptyName(item.id.clone()));
            }
            // 同名取第一条
            by_key.entry(key).or_insert(idx);
        }
        Ok(Self {
            items,
            by_key,
            by_id,
        })
    }

    /// 从 JSON 数组文件加载（每项 {id, name, price, ...}）
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let items: Vec<CatalogItem> = serde_json::from_str(&data)?;
        let catalog = Self::new(items)?;
        tracing::info!(items = catalog.len(), path = %path.display(), "catalog loaded");
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.by_id.get(id).map(|&idx| &self.items[idx])
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 解析口语商品名；同层级多条命中时取目录中靠前者
    pub fn resolve(&self, query: &str) -> CatalogMatch<'_> {
        let key = normalize_key(query);
        if key.is_empty() {
            return CatalogMatch::NoMatch;
        }
        if let Some(&idx) = self.by_key.get(&key) {
            return CatalogMatch::Exact(&self.items[idx]);
        }
        let normalized: Vec<(usize, String)> = self
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| (idx, normalize_key(&item.name)))
            .collect();
        if let Some((idx, _)) = normalized.iter().find(|(_, name)| name.starts_with(&key)) {
            return CatalogMatch::Prefix(&self.items[*idx]);
        }
        if let Some((idx, _)) = normalized
            .iter()
            .find(|(_, name)| name.contains(&key) || key.contains(name.as_str()))
        {
            return CatalogMatch::Substring(&self.items[*idx]);
        }
        CatalogMatch::NoMatch
    }

    /// 名称或分类包含关键词的条目（用于 "what burgers do you have"）
    pub fn search(&self, keyword: &str) -> Vec<&CatalogItem> {
        let key = normalize_key(keyword);
        if key.is_empty() {
            return Vec::new();
        }
        self.items
            .iter()
            .filter(|item| {
                normalize_key(&item.name).contains(&key)
                    || item
                        .category
                        .as_deref()
                        .map(|c| normalize_key(c).contains(&key))
                        .unwrap_or(false)
            })
            .collect()
    }
}
