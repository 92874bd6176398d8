use insta::assert_snapshot;
use xslforms::extensions::TemplateContext;
use xslforms::output::path_to_node;
use xslforms::output::PathReference;
use xslforms::utils::add_elements;
use xslforms::utils::remove_elements;
use xslforms::xml::from_xml;
use xslforms::xml::to_xml;
use xslforms::Document;
use xslforms::Encoding;
use xslforms::Field;
use xslforms::FieldProcessor;
use xslforms::FieldsError;
use xslforms::Form;
use xslforms::NodeRef;
use xslforms::TemplateFunction;

fn zoo_fields() -> Vec<Field> {
    vec![
        Field::new("_action_update", "Update"),
        Field::new("_action_delete=/zoo$1/cage$2", "Delete"),
        Field::new("_action_nasty=/zoo$1/cage$3", "Nasty"),
        Field::new("/zoo$1/name", "The Zoo"),
        Field::new("/zoo$1/cage$1/name", "reptiles"),
        Field::new("/zoo$1/cage$1/capacity", "5"),
        Field::new("/zoo$1/cage$1/animal$1/name", "Monty"),
        Field::new("/zoo$1/cage$1/animal$1/species$1/name", "Python"),
        Field::new("/zoo$1/cage$1/animal$1/property$2/name", "texture"),
        Field::new("/zoo$1/cage$1/animal$1/property$2/value", "scaled"),
        Field::new("/zoo$1/cage$2/name", "mammals"),
        Field::new("/zoo$1/cage$2/capacity", "25"),
        Field::new("/zoo$1/cage$2/animal$1/name", "Simon"),
        Field::new("/zoo$1/funding$3/type", "private"),
        Field::new("/zoo$1/funding$3/contributor$1/industry$$type", "animals"),
    ]
}

/// The field name of every attribute in `document`, paired with its value.
fn attribute_fields(document: &Document) -> Vec<Field> {
    document
        .descendants()
        .into_iter()
        .flat_map(|id| {
            document
                .element(id)
                .attributes()
                .iter()
                .map(move |(name, value)| {
                    let path = path_to_node(
                        document,
                        &NodeRef::Element(id),
                        PathReference::Attribute(Some(name.as_str())),
                    );
                    Field::new(path, value.as_str())
                })
        })
        .collect()
}

mod building {
    use super::*;

    #[test]
    fn test_zoo_document() {
        let documents = FieldProcessor::default()
            .make_documents(&zoo_fields())
            .unwrap();

        assert_eq!(documents.len(), 1);
        assert_snapshot!(
            to_xml(documents.get("zoo").unwrap()).unwrap(),
            @r#"<zoo name="The Zoo"><cage capacity="5" name="reptiles"><animal name="Monty"><species name="Python"/><property name="texture" value="scaled"/></animal></cage><cage capacity="25" name="mammals"><animal name="Simon"/></cage><funding type="private"><contributor><industry type="animals"/></contributor></funding></zoo>"#
        );
    }

    #[test]
    fn test_building_is_deterministic() {
        let processor = FieldProcessor::default();
        let first = processor.make_documents(&zoo_fields()).unwrap();
        let second = processor.make_documents(&zoo_fields()).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            to_xml(first.get("zoo").unwrap()).unwrap(),
            to_xml(second.get("zoo").unwrap()).unwrap()
        );
    }

    #[test]
    fn test_sparse_index() {
        let documents = FieldProcessor::default()
            .make_documents(&[Field::new("/zoo$1/cage$2/name", "mammals")])
            .unwrap();
        assert_snapshot!(
            to_xml(documents.get("zoo").unwrap()).unwrap(),
            @r#"<zoo><placeholder/><cage name="mammals"/></zoo>"#
        );
    }

    #[test]
    fn test_multivalue_leaf_in_list_mode() {
        let documents = FieldProcessor::new(Encoding::Utf8, true)
            .make_documents(&[Field::new(
                "/package$1/categories$1/category$$value",
                vec!["xml", "web", "forms"],
            )])
            .unwrap();
        assert_snapshot!(
            to_xml(documents.get("package").unwrap()).unwrap(),
            @r#"<package><categories><category value="xml"/><category value="web"/><category value="forms"/></categories></package>"#
        );
    }

    #[test]
    fn test_carriage_returns_are_stripped() {
        let documents = FieldProcessor::default()
            .make_documents(&[Field::new("/zoo$1/cage$1/notes", "line one\r\nline two")])
            .unwrap();
        let zoo = documents.get("zoo").unwrap();
        let cage = zoo.find_element(zoo.root(), "cage", 1).unwrap();
        assert_eq!(zoo.attribute(cage, "notes"), Some("line one\nline two"));
    }

    #[test]
    fn test_conflict_names_the_field() {
        let mut fields = zoo_fields();
        fields.push(Field::new("/zoo$1/cage$3/name", "birds"));

        let error = FieldProcessor::default()
            .make_documents(&fields)
            .unwrap_err();
        assert_eq!(
            error,
            FieldsError::Conflict {
                field: "/zoo$1/cage$3/name".to_string(),
                name: "cage".to_string(),
                position: 3,
                found: "funding".to_string(),
            }
        );
        assert_snapshot!(
            error.to_string(),
            @"In field '/zoo$1/cage$3/name', name 'cage' at position 3 could not be added, since 'funding' was found"
        );
    }
}

mod round_trip {
    use super::*;

    #[test]
    fn test_paths_rebuild_the_same_document() {
        let processor = FieldProcessor::default();
        let documents = processor.make_documents(&zoo_fields()).unwrap();
        let zoo = documents.get("zoo").unwrap();

        let rebuilt = processor.make_documents(&attribute_fields(zoo)).unwrap();
        assert_eq!(
            to_xml(rebuilt.get("zoo").unwrap()).unwrap(),
            to_xml(zoo).unwrap()
        );
    }

    #[test]
    fn test_paths_through_xml() {
        let processor = FieldProcessor::default();
        let documents = processor.make_documents(&zoo_fields()).unwrap();
        let xml = to_xml(documents.get("zoo").unwrap()).unwrap();

        let read = from_xml(&xml).unwrap();
        let rebuilt = processor.make_documents(&attribute_fields(&read)).unwrap();
        assert_eq!(to_xml(rebuilt.get("zoo").unwrap()).unwrap(), xml);
    }

    #[test]
    fn test_template_functions_name_submitted_fields() {
        let documents = FieldProcessor::default()
            .make_documents(&zoo_fields())
            .unwrap();
        let zoo = documents.get("zoo").unwrap();
        let cage = zoo.find_element(zoo.root(), "cage", 2).unwrap();
        let node = NodeRef::attribute(cage, "capacity");
        let context = TemplateContext::new(zoo, &node).with_this_name("capacity");

        let function: TemplateFunction = "field-name".parse().unwrap();
        assert_eq!(
            function.call(&context, &[]).unwrap().as_text(),
            Some("/zoo$1/cage$2/capacity")
        );
    }
}

mod selectors {
    use super::*;

    #[test]
    fn test_past_the_end_selector_is_empty() {
        let mut form = Form::new(FieldProcessor::default());
        form.set_parameters(zoo_fields()).unwrap();

        let selectors = form.selectors(false).unwrap();
        assert_eq!(selectors.get("_action_nasty"), Some(&[][..]));
        assert_eq!(selectors.get("_action_delete").map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_delete_then_add() {
        let mut form = Form::new(FieldProcessor::default());
        form.set_parameters(zoo_fields()).unwrap();

        let delete = form.selector("_action_delete", false).unwrap();
        remove_elements(form.documents_mut(), &delete);
        assert_snapshot!(
            to_xml(form.document("zoo").unwrap()).unwrap(),
            @r#"<zoo name="The Zoo"><cage capacity="5" name="reptiles"><animal name="Monty"><species name="Python"/><property name="texture" value="scaled"/></animal></cage><funding type="private"><contributor><industry type="animals"/></contributor></funding></zoo>"#
        );

        form.set_parameters(vec![
            Field::new("/zoo$1/cage$1/name", "reptiles"),
            Field::new("_action_add_animal=/zoo$1/cage$1", "Add"),
        ])
        .unwrap();
        let add = form.selector("_action_add_animal", false).unwrap();
        add_elements(form.documents_mut(), &add, &["animal"]);
        assert_snapshot!(
            to_xml(form.document("zoo").unwrap()).unwrap(),
            @r#"<zoo><cage name="reptiles"><animal/></cage></zoo>"#
        );
    }
}
