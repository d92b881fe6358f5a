use smart_entity::entity::{Entity, EntityModel};
use smart_macros::entity_model;

#[entity_model]
struct Tag {
    label: String,
}

#[entity_model(name = "shop.Order", id = u64)]
struct Order {
    total: i64,
}

fn main() {
    let tag = Tag {
        id: "t-1".to_string(),
        label: "new".to_string(),
    };
    assert_eq!(Tag::TYPE, "Tag");
    assert_eq!(tag.entity_type(), "Tag"); // 类型名默认取结构体名

    let order = Order::default();
    let _: &u64 = order.id(); // id 类型可配置
    assert_eq!(Order::TABLE, "shop.Order");
}
