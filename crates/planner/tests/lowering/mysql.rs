use crate::fixtures::{catalog, cond, optimize};
use domain_syntax::{Domain, OptLevel, SubQuery};
use model::core::value::Value;
use planner::{MemoryCatalog, MySql, dialect_by_name, to_sql};

fn lower(catalog: &MemoryCatalog, domain: Domain) -> (String, Vec<Value>) {
    let optimized = optimize(catalog, domain, OptLevel::ToSql).unwrap();
    to_sql(&optimized, catalog, &MySql, None).unwrap()
}

#[test]
fn test_quoting_and_placeholders() {
    let catalog = catalog();
    let domain = cond("color", "in", vec![1, 2]) & cond("name", "=", "Acme");

    let (sql, params) = lower(&catalog, domain);
    assert_eq!(sql, "(`res_partner`.`color` IN (?, ?) AND `res_partner`.`name` = ?)");
    assert_eq!(params, vec![Value::Int(1), Value::Int(2), Value::from("Acme")]);
}

#[test]
fn test_case_insensitive_patterns() {
    let catalog = catalog();

    let (sql, params) = lower(&catalog, cond("name", "ilike", "acme"));
    assert_eq!(sql, "LOWER(`res_partner`.`name`) LIKE LOWER(?)");
    assert_eq!(params, vec![Value::from("%acme%")]);

    let (sql, params) = lower(&catalog, cond("name", "=ilike", "acme%"));
    assert_eq!(sql, "LOWER(`res_partner`.`name`) LIKE LOWER(?)");
    assert_eq!(params, vec![Value::from("acme%")]);

    let (sql, _) = lower(&catalog, cond("email", "not ilike", "acme"));
    assert_eq!(
        sql,
        "(LOWER(`res_partner`.`email`) NOT LIKE LOWER(?) OR `res_partner`.`email` IS NULL)"
    );

    let (sql, _) = lower(&catalog, cond("color", "like", "7"));
    assert_eq!(sql, "CAST(`res_partner`.`color` AS CHAR) LIKE ?");
}

#[test]
fn test_json_path() {
    let catalog = catalog();

    let (sql, params) = lower(&catalog, cond("props.size.unit", "=", "cm"));
    assert_eq!(
        sql,
        r#"JSON_UNQUOTE(JSON_EXTRACT(`res_partner`.`props`, '$."size"."unit"')) = ?"#
    );
    assert_eq!(params, vec![Value::from("cm")]);
}

#[test]
fn test_many2many_traversal() {
    let catalog = catalog();

    let (sql, _) = lower(&catalog, cond("category_ids", "not any", cond("name", "=", "B2B")));
    assert_eq!(
        sql,
        concat!(
            "NOT EXISTS (SELECT 1 FROM `partner_category_rel` AS `partner_category_rel__1` ",
            "WHERE `partner_category_rel__1`.`partner_id` = `res_partner`.`id` ",
            "AND `partner_category_rel__1`.`category_id` IN (",
            "SELECT `res_partner_category__2`.`id` FROM `res_partner_category` AS `res_partner_category__2` ",
            "WHERE `res_partner_category__2`.`name` = ?))"
        )
    );
}

#[test]
fn test_opaque_query_keeps_question_marks() {
    let catalog = catalog();
    let query = SubQuery::new(
        "SELECT id FROM res_country WHERE code IN (%s, %s)",
        vec![Value::from("BE"), Value::from("CL")],
    );

    let (sql, params) = lower(&catalog, cond("country_id", "not in", query));
    assert_eq!(
        sql,
        "(`res_partner`.`country_id` IS NULL OR `res_partner`.`country_id` NOT IN (SELECT id FROM res_country WHERE code IN (?, ?)))"
    );
    assert_eq!(params, vec![Value::from("BE"), Value::from("CL")]);
}

#[test]
fn test_dialect_lookup() {
    let catalog = catalog();
    let optimized = optimize(&catalog, cond("active", "=", true), OptLevel::ToSql).unwrap();

    let dialect = dialect_by_name("MariaDB").unwrap();
    let (sql, _) = to_sql(&optimized, &catalog, dialect.as_ref(), Some("p")).unwrap();
    assert_eq!(sql, "`p`.`active` = ?");
    assert!(dialect_by_name("sqlite").is_none());
}
