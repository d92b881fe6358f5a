use crate::{
    delegator::Delegator,
    entity::{BoxEntity, Entity},
    entity_type::EntityType,
    error::{DomainError, DomainResult},
    query::{Direction, FindOptions, OrderBy, Page, PageRequest},
};
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// 基于内存的 Delegator 实现
/// - 按表名分区保存实体，同一继承体系的实体共享一张表
/// - 支持等值过滤、排序、投影与分页；条件串查询不受支持
/// - `use_cache` 被忽略，每次读取都是最新数据
#[derive(Default)]
pub struct InMemoryDelegator {
    tables: DashMap<&'static str, BTreeMap<String, BoxEntity>>,
    referenced: DashSet<(&'static str, String)>,
}

impl InMemoryDelegator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记某条记录被其他实体引用，删除时将报告约束冲突
    pub fn reference(&self, table: &'static str, id: &Value) {
        self.referenced.insert((table, row_key(id)));
    }

    /// 表内记录数
    pub fn count(&self, table: &str) -> usize {
        self.tables.get(table).map(|t| t.len()).unwrap_or(0)
    }

    fn select(
        &self,
        ty: &EntityType,
        and_map: &Map<String, Value>,
        opts: &FindOptions,
    ) -> DomainResult<Vec<BoxEntity>> {
        let rows: Vec<BoxEntity> = match self.tables.get(ty.table()) {
            Some(table) => table
                .values()
                .filter(|e| visible(ty, e))
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        let mut matched = Vec::with_capacity(rows.len());
        for entity in rows {
            let value = entity.to_value()?;
            let hit = and_map
                .iter()
                .all(|(k, expected)| value.get(k) == Some(expected));
            if hit {
                matched.push((value, entity));
            }
        }

        if let Some(order_by) = opts.order_by.as_deref() {
            matched.sort_by(|(a, _), (b, _)| compare_rows(a, b, order_by));
        }

        match opts.fields.as_ref().filter(|f| !f.is_empty()) {
            Some(fields) => matched
                .into_iter()
                .map(|(value, _)| {
                    let projected: Map<String, Value> = value
                        .as_object()
                        .into_iter()
                        .flatten()
                        .filter(|(k, _)| fields.contains(*k) || k.as_str() == ty.id_field())
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    ty.instantiate(Value::Object(projected))
                })
                .collect(),
            None => Ok(matched.into_iter().map(|(_, e)| e).collect()),
        }
    }
}

#[async_trait]
impl Delegator for InMemoryDelegator {
    async fn find_by_id(
        &self,
        ty: &EntityType,
        id: &Value,
        _use_cache: bool,
    ) -> DomainResult<Option<BoxEntity>> {
        let key = row_key(id);
        Ok(self
            .tables
            .get(ty.table())
            .and_then(|table| table.get(&key).cloned())
            .filter(|e| visible(ty, e)))
    }

    async fn find_list_by_and(
        &self,
        ty: &EntityType,
        and_map: &Map<String, Value>,
        opts: &FindOptions,
    ) -> DomainResult<Vec<BoxEntity>> {
        self.select(ty, and_map, opts)
    }

    async fn find_list_by_condition(
        &self,
        ty: &EntityType,
        condition: &str,
        _opts: &FindOptions,
    ) -> DomainResult<Vec<BoxEntity>> {
        Err(unsupported_condition(ty, condition))
    }

    async fn find_page_by_and(
        &self,
        ty: &EntityType,
        and_map: &Map<String, Value>,
        page: PageRequest,
        opts: &FindOptions,
    ) -> DomainResult<Page<BoxEntity>> {
        let all = self.select(ty, and_map, opts)?;
        let total = all.len() as u64;
        let list = all
            .into_iter()
            .skip(page.offset())
            .take(page.page_size as usize)
            .collect();
        Ok(Page::new(list, total, page))
    }

    async fn find_page_by_condition(
        &self,
        ty: &EntityType,
        condition: &str,
        _page: PageRequest,
        _opts: &FindOptions,
    ) -> DomainResult<Page<BoxEntity>> {
        Err(unsupported_condition(ty, condition))
    }

    async fn save(&self, entity: BoxEntity) -> DomainResult<BoxEntity> {
        let id = entity.id_value()?;
        if is_blank(&id) {
            return Err(DomainError::InvalidValue {
                reason: format!("{} requires an id before saving", entity.entity_type()),
            });
        }

        let key = row_key(&id);
        debug!(entity = entity.entity_type(), id = %key, "in-memory save");
        self.tables
            .entry(entity.table())
            .or_default()
            .insert(key, entity.clone());
        Ok(entity)
    }

    async fn remove(&self, entity: &dyn Entity) -> DomainResult<()> {
        let key = row_key(&entity.id_value()?);
        if self.referenced.contains(&(entity.table(), key.clone())) {
            return Err(DomainError::ConstraintViolation {
                reason: format!("{}[{key}] is referenced", entity.table()),
            });
        }

        let removed = self
            .tables
            .get_mut(entity.table())
            .and_then(|mut table| table.remove(&key));
        match removed {
            Some(_) => {
                debug!(entity = entity.entity_type(), id = %key, "in-memory remove");
                Ok(())
            }
            None => Err(DomainError::NotFound {
                reason: format!("{}[{key}]", entity.table()),
            }),
        }
    }
}

/// 基类型（类型名即表名）可见整张表，子类型只可见自身的记录
fn visible(ty: &EntityType, entity: &BoxEntity) -> bool {
    ty.name() == ty.table() || entity.entity_type() == ty.name()
}

fn unsupported_condition(ty: &EntityType, condition: &str) -> DomainError {
    DomainError::Unsupported {
        reason: format!(
            "condition queries are not supported in memory: {} where {condition}",
            ty.name()
        ),
    }
}

// 数字与字符串形式的同一 id 映射到同一行
fn row_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_blank(id: &Value) -> bool {
    match id {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn compare_rows(a: &Value, b: &Value, order_by: &[OrderBy]) -> Ordering {
    order_by
        .iter()
        .map(|o| {
            let ord = compare_values(a.get(&o.field), b.get(&o.field));
            match o.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityModel;
    use crate::query::FieldSet;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct Post {
        id: String,
        title: String,
        score: i64,
    }

    impl EntityModel for Post {
        const TYPE: &'static str = "Post";
        const FIELDS: &'static [&'static str] = &["id", "title", "score"];
        type Id = String;

        fn id(&self) -> &String {
            &self.id
        }
    }

    fn post(id: &str, title: &str, score: i64) -> BoxEntity {
        Box::new(Post {
            id: id.into(),
            title: title.into(),
            score,
        })
    }

    async fn seeded() -> InMemoryDelegator {
        let d = InMemoryDelegator::new();
        d.save(post("p1", "a", 3)).await.unwrap();
        d.save(post("p2", "b", 9)).await.unwrap();
        d.save(post("p3", "a", 5)).await.unwrap();
        d
    }

    #[tokio::test]
    async fn find_by_id_and_missing() {
        let d = seeded().await;
        let ty = EntityType::of::<Post>();

        let found = d.find_by_id(&ty, &json!("p2"), false).await.unwrap();
        assert_eq!(found.unwrap().downcast_ref::<Post>().unwrap().score, 9);
        assert!(d.find_by_id(&ty, &json!("nope"), false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn filter_order_and_project() {
        let d = seeded().await;
        let ty = EntityType::of::<Post>();

        let mut and_map = Map::new();
        and_map.insert("title".into(), json!("a"));
        let opts = FindOptions::builder()
            .order_by(vec![OrderBy::desc("score")])
            .fields(FieldSet::from(["score".to_string()]))
            .build();

        let list = d.find_list_by_and(&ty, &and_map, &opts).await.unwrap();
        let posts: Vec<&Post> = list.iter().map(|e| e.downcast_ref::<Post>().unwrap()).collect();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "p3");
        assert_eq!(posts[1].id, "p1");
        // 未选择的字段回落为默认值
        assert_eq!(posts[0].title, "");
    }

    #[tokio::test]
    async fn paging_slices_and_counts() {
        let d = seeded().await;
        let ty = EntityType::of::<Post>();
        let opts = FindOptions::builder()
            .order_by(vec![OrderBy::asc("score")])
            .build();

        let page = d
            .find_page_by_and(&ty, &Map::new(), PageRequest::new(2, 2).unwrap(), &opts)
            .await
            .unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.list.len(), 1);
        assert_eq!(page.list[0].downcast_ref::<Post>().unwrap().id, "p2");
    }

    #[tokio::test]
    async fn referenced_rows_cannot_be_removed() {
        let d = seeded().await;
        d.reference("Post", &json!("p1"));

        let p1 = post("p1", "a", 3);
        let err = d.remove(p1.as_ref()).await.unwrap_err();
        assert!(err.is_constraint_violation());
        assert_eq!(d.count("Post"), 3);

        d.remove(post("p2", "b", 9).as_ref()).await.unwrap();
        assert_eq!(d.count("Post"), 2);
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct Dog {
        id: String,
        name: String,
    }

    impl EntityModel for Dog {
        const TYPE: &'static str = "Dog";
        const TABLE: &'static str = "Animal";
        const FIELDS: &'static [&'static str] = &["id", "name"];
        type Id = String;

        fn id(&self) -> &String {
            &self.id
        }
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct Cat {
        id: String,
        name: String,
        lives: u8,
    }

    impl EntityModel for Cat {
        const TYPE: &'static str = "Cat";
        const TABLE: &'static str = "Animal";
        const FIELDS: &'static [&'static str] = &["id", "name", "lives"];
        type Id = String;

        fn id(&self) -> &String {
            &self.id
        }
    }

    #[tokio::test]
    async fn sibling_subtypes_do_not_see_each_other() {
        let d = InMemoryDelegator::new();
        d.save(Box::new(Cat {
            id: "c1".into(),
            name: "tom".into(),
            lives: 9,
        }))
        .await
        .unwrap();
        let dog = EntityType::of::<Dog>();
        let cat = EntityType::of::<Cat>();

        assert!(d.find_by_id(&dog, &json!("c1"), false).await.unwrap().is_none());
        let list = d
            .find_list_by_and(&dog, &Map::new(), &FindOptions::default())
            .await
            .unwrap();
        assert!(list.is_empty());

        let found = d.find_by_id(&cat, &json!("c1"), false).await.unwrap().unwrap();
        assert_eq!(found.downcast_ref::<Cat>().unwrap().lives, 9);
    }

    #[tokio::test]
    async fn save_requires_id_and_condition_is_unsupported() {
        let d = InMemoryDelegator::new();
        let err = d.save(post("", "x", 0)).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidValue { .. }));

        let ty = EntityType::of::<Post>();
        let err = d
            .find_list_by_condition(&ty, "score > 1", &FindOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unsupported { .. }));
    }
}
