use staffstore_core::{
    Employee, EmployeeQuery, EmployeeRepository, NewEmployee, PagePolicy, QueryRepository,
    RepoError, SortField, YamlFileRepository,
};

fn staff(dir: &tempfile::TempDir) -> YamlFileRepository {
    let mut repo = YamlFileRepository::open(dir.path().join("staff.yaml"));
    for (first, last, salary, passport) in [
        ("Anna", "Ivanova", 300, "1111111111"),
        ("Boris", "Ivanov", 100, "2222222222"),
        ("Vera", "Sidorova", 200, "3333333333"),
        ("Gleb", "Orlov", 100, "4444444444"),
        ("Dina", "ivashko", 500, "5555555555"),
    ] {
        repo.add(NewEmployee::new(first, last, salary, passport, None).unwrap())
            .unwrap();
    }
    repo
}

fn ids(employees: &[Employee]) -> Vec<u32> {
    employees.iter().map(Employee::employee_id).collect()
}

#[test]
fn empty_query_pages_like_the_inner_repository() {
    let dir = tempfile::tempdir().unwrap();
    let repo = staff(&dir);
    let query = QueryRepository::new(&repo);

    for page in 1..=3 {
        assert_eq!(
            ids(&query.get_page(2, page, &EmployeeQuery::new()).unwrap()),
            ids(&repo.get_page(2, page).unwrap())
        );
    }
    assert_eq!(query.count(&EmployeeQuery::new()).unwrap(), 5);
}

#[test]
fn filter_then_sort_then_window() {
    let dir = tempfile::tempdir().unwrap();
    let repo = staff(&dir);
    let query = QueryRepository::new(&repo);
    let ivs = EmployeeQuery::new()
        .last_name_starts_with("iv")
        .sort_by(SortField::Salary, true);

    assert_eq!(query.count(&ivs).unwrap(), 3);
    assert_eq!(ids(&query.get_page(2, 1, &ivs).unwrap()), vec![5, 1]);
    assert_eq!(ids(&query.get_page(2, 2, &ivs).unwrap()), vec![2]);
}

#[test]
fn stable_sort_keeps_equal_salaries_in_backing_order() {
    let dir = tempfile::tempdir().unwrap();
    let repo = staff(&dir);
    let query = QueryRepository::new(&repo);

    let ascending = EmployeeQuery::new().sort_by(SortField::Salary, false);
    assert_eq!(
        ids(&query.get_page(5, 1, &ascending).unwrap()),
        vec![2, 4, 3, 1, 5]
    );
    let descending = EmployeeQuery::new().sort_by(SortField::Salary, true);
    assert_eq!(
        ids(&query.get_page(5, 1, &descending).unwrap()),
        vec![5, 1, 3, 2, 4]
    );
}

#[test]
fn custom_filters_combine_with_presets() {
    let dir = tempfile::tempdir().unwrap();
    let repo = staff(&dir);
    let query = QueryRepository::new(&repo);
    let selection = EmployeeQuery::new()
        .salary_between(100, 300)
        .filter(|employee| employee.first_name().len() == 4);

    assert_eq!(ids(&query.get_page(10, 1, &selection).unwrap()), vec![1, 3, 4]);
}

#[test]
fn decorator_uses_the_inner_page_policy_and_never_persists() {
    let dir = tempfile::tempdir().unwrap();
    let repo = staff(&dir).with_page_policy(PagePolicy::Strict);
    let before = std::fs::read_to_string(repo.path()).unwrap();
    let query = QueryRepository::new(&repo);

    let narrow = EmployeeQuery::new()
        .salary_between(500, 600)
        .sort_by(SortField::LastName, false);
    assert_eq!(ids(&query.get_page(1, 1, &narrow).unwrap()), vec![5]);
    assert!(matches!(
        query.get_page(1, 2, &narrow),
        Err(RepoError::PageOutOfRange { total: 1, .. })
    ));
    assert!(matches!(
        query.get_page(0, 1, &narrow),
        Err(RepoError::Validation(_))
    ));

    assert_eq!(std::fs::read_to_string(repo.path()).unwrap(), before);
}
