use smart_entity::entity::Entity;
use smart_entity::validation::{ConstraintViolation, ValidateProfile};
use smart_macros::entity_model;

#[entity_model(validate = Account::rules)]
#[derive(PartialEq)]
struct Account {
    owner: String,
}

impl Account {
    fn rules(&self, _profile: ValidateProfile) -> Vec<ConstraintViolation> {
        vec![ConstraintViolation::new("owner", "required", "owner is required")]
    }
}

fn main() {
    let account = Account::default();
    let boxed: Box<dyn Entity> = Box::new(account.clone()); // 已自动派生 Clone/Default
    assert_eq!(boxed.validate(ValidateProfile::Create).len(), 1);
    assert!(account == Account::default()); // 用户派生与宏派生合并
}
