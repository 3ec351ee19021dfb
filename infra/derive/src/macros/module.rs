use fxhash::FxHashSet;
use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::parse::Parser;
use syn::{
    Attribute, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, LitStr, Pat, Path, ReturnType, Type,
    Visibility,
};

/// Arguments of `#[store_module(...)]`.
#[derive(Default)]
struct ModuleArgs {
    state: Option<Type>,
    base: Option<Ident>,
    extends: Option<Path>,
    via: Option<Ident>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Marker {
    Getter,
    Mutation,
    Action,
}

impl Marker {
    fn from_attr(attr: &Attribute) -> Option<Self> {
        let path = attr.path();
        if path.is_ident("getter") {
            Some(Self::Getter)
        } else if path.is_ident("mutation") {
            Some(Self::Mutation)
        } else if path.is_ident("action") {
            Some(Self::Action)
        } else {
            None
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Getter => "getter",
            Self::Mutation => "mutation",
            Self::Action => "action",
        }
    }
}

/// One marked method, split into the pieces the expansion needs.
struct Operation {
    marker: Marker,
    name: LitStr,
    silent: bool,
    vis: Visibility,
    ident: Ident,
    body_ident: Ident,
    params: Vec<(Ident, Type)>,
    output: Type,
    fallible: bool,
    docs: Vec<Attribute>,
}

pub fn expand_module(attr: TokenStream, item: ItemImpl) -> TokenStream {
    match expand(attr, item) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(attr: TokenStream, mut item: ItemImpl) -> syn::Result<TokenStream> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[store_module] must be placed on an inherent impl block",
        ));
    }
    let args = parse_args(attr)?;

    let mut operations = Vec::new();
    let mut errors: Option<syn::Error> = None;
    let mut items = Vec::with_capacity(item.items.len());

    for impl_item in std::mem::take(&mut item.items) {
        let ImplItem::Fn(method) = impl_item else {
            items.push(impl_item);
            continue;
        };
        match split_method(method) {
            Ok((body, Some(operation))) => {
                items.push(ImplItem::Fn(body));
                operations.push(operation);
            },
            Ok((body, None)) => items.push(ImplItem::Fn(body)),
            Err(err) => push_error(&mut errors, err),
        }
    }

    for err in duplicate_errors(&operations) {
        push_error(&mut errors, err);
    }
    if let Some(err) = errors {
        return Err(err);
    }

    item.items = items;
    let redirects = operations.iter().map(redirect);
    let registrations = operations.iter().map(registration);
    let self_ty = &item.self_ty;
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();
    let (state, base, lineage) = module_shape(&args)?;

    Ok(quote! {
        #item

        impl #impl_generics #self_ty #where_clause {
            #(#redirects)*
        }

        impl #impl_generics ::storemod_core::StoreModule for #self_ty #where_clause {
            type State = #state;

            #[inline]
            fn base(&self) -> &::storemod_core::ModuleBase<Self::State> {
                #base
            }

            fn operations() -> ::core::result::Result<
                ::storemod_core::OperationTable<Self>,
                ::storemod_core::ModuleError,
            > {
                #[allow(unused_mut)]
                let mut table = ::storemod_core::OperationTable::new(::core::any::type_name::<Self>());
                #(#registrations)*
                ::core::result::Result::Ok(table)
            }

            #lineage
        }
    })
}

fn parse_args(attr: TokenStream) -> syn::Result<ModuleArgs> {
    let mut args = ModuleArgs::default();
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("state") {
            args.state = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("base") {
            args.base = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("extends") {
            args.extends = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("via") {
            args.via = Some(meta.value()?.parse()?);
        } else {
            return Err(meta.error("expected one of: state, base, extends, via"));
        }
        Ok(())
    });
    parser.parse2(attr)?;

    match (&args.state, &args.extends) {
        (Some(_), Some(_)) => Err(syn::Error::new(
            Span::call_site(),
            "`state` and `extends` are mutually exclusive; a derived module inherits its parent's state",
        )),
        (None, None) => Err(syn::Error::new(
            Span::call_site(),
            "#[store_module] needs either `state = Type` or `extends = Parent`",
        )),
        (Some(_), None) if args.via.is_some() => {
            Err(syn::Error::new(Span::call_site(), "`via` is only meaningful together with `extends`"))
        },
        (None, Some(_)) if args.base.is_some() => Err(syn::Error::new(
            Span::call_site(),
            "a derived module shares its parent's base; `base` cannot be set with `extends`",
        )),
        _ => Ok(args),
    }
}

/// Returns the associated state type, the `base()` body and an optional `lineage()` override.
fn module_shape(args: &ModuleArgs) -> syn::Result<(TokenStream, TokenStream, TokenStream)> {
    if let Some(state) = &args.state {
        let base = args.base.clone().unwrap_or_else(|| format_ident!("base"));
        return Ok((quote! { #state }, quote! { &self.#base }, quote! {}));
    }

    let Some(parent) = &args.extends else {
        return Err(syn::Error::new(Span::call_site(), "missing `extends`"));
    };
    let via = args.via.clone().unwrap_or_else(|| format_ident!("parent"));
    let state = quote! { <#parent as ::storemod_core::StoreModule>::State };
    let base = quote! { ::storemod_core::StoreModule::base(&*self.#via) };
    let lineage = quote! {
        fn lineage() -> ::core::result::Result<
            ::storemod_core::Lineage<Self>,
            ::storemod_core::ModuleError,
        > {
            let inherited = <#parent as ::storemod_core::StoreModule>::lineage()?;
            ::core::result::Result::Ok(
                inherited.lift(|this: &Self| &this.#via).derive(Self::operations()?),
            )
        }
    };
    Ok((state, base, lineage))
}

/// Splits a method into the private body it keeps and the operation it declares, if marked.
fn split_method(mut method: ImplItemFn) -> syn::Result<(ImplItemFn, Option<Operation>)> {
    let mut marker = None;
    let mut kept = Vec::with_capacity(method.attrs.len());
    for attr in std::mem::take(&mut method.attrs) {
        match Marker::from_attr(&attr) {
            Some(found) if marker.is_some() => {
                return Err(syn::Error::new_spanned(
                    attr,
                    format!("a method carries at most one marker; found a second `{}`", found.label()),
                ));
            },
            Some(found) => marker = Some((found, attr)),
            None => kept.push(attr),
        }
    }
    method.attrs = kept;

    let Some((marker, attr)) = marker else {
        return Ok((method, None));
    };
    let (name, silent) = parse_marker(marker, &attr, &method.sig.ident)?;
    check_signature(&method)?;

    let params = method
        .sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(typed) => Some(typed),
            FnArg::Receiver(_) => None,
        })
        .map(|typed| {
            let Pat::Ident(pat) = &*typed.pat else {
                return Err(syn::Error::new_spanned(
                    &typed.pat,
                    "marked operations need plain identifier parameters",
                ));
            };
            reject_borrowed(&typed.ty)?;
            Ok((pat.ident.clone(), (*typed.ty).clone()))
        })
        .collect::<syn::Result<Vec<_>>>()?;

    let (output, fallible) = match &method.sig.output {
        ReturnType::Default => (syn::parse_quote!(()), false),
        ReturnType::Type(_, ty) => {
            reject_borrowed(ty)?;
            result_ok_type(ty).map_or_else(|| ((**ty).clone(), false), |ok| (ok.clone(), true))
        },
    };

    let ident = method.sig.ident.clone();
    let body_ident = format_ident!("__storemod_{ident}");
    let (docs, rest): (Vec<_>, Vec<_>) =
        std::mem::take(&mut method.attrs).into_iter().partition(|a| a.path().is_ident("doc"));

    let operation = Operation {
        marker,
        name,
        silent,
        vis: std::mem::replace(&mut method.vis, Visibility::Inherited),
        ident,
        body_ident: body_ident.clone(),
        params,
        output,
        fallible,
        docs,
    };

    method.attrs = rest;
    method.attrs.push(syn::parse_quote!(#[doc(hidden)]));
    method.sig.ident = body_ident;
    Ok((method, Some(operation)))
}

fn parse_marker(marker: Marker, attr: &Attribute, ident: &Ident) -> syn::Result<(LitStr, bool)> {
    let mut name = LitStr::new(&ident.to_string(), ident.span());
    let mut silent = false;
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok((name, silent));
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            name = meta.value()?.parse()?;
            if name.value().is_empty() || name.value().contains('/') {
                return Err(meta.error("operation names must be non-empty and must not contain '/'"));
            }
        } else if meta.path.is_ident("silent") && marker == Marker::Mutation {
            silent = true;
        } else {
            return Err(meta.error(format!("unsupported `{}` argument", marker.label())));
        }
        Ok(())
    })?;
    Ok((name, silent))
}

fn check_signature(method: &ImplItemFn) -> syn::Result<()> {
    let sig = &method.sig;
    let borrowed_self = sig.receiver().is_some_and(|r| r.reference.is_some() && r.mutability.is_none());
    if !borrowed_self {
        return Err(syn::Error::new_spanned(
            &sig.ident,
            "marked operations must take `&self`; state changes go through the module base",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&sig.generics, "marked operations cannot be generic"));
    }
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(asyncness, "marked operations are synchronous"));
    }
    Ok(())
}

fn reject_borrowed(ty: &Type) -> syn::Result<()> {
    match ty {
        Type::Reference(_) | Type::ImplTrait(_) => Err(syn::Error::new_spanned(
            ty,
            "values crossing the host boundary must be owned, serializable types",
        )),
        _ => Ok(()),
    }
}

fn result_ok_type(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    if segment.ident != "Result" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(ok) => Some(ok),
        _ => None,
    }
}

fn duplicate_errors(operations: &[Operation]) -> Vec<syn::Error> {
    let mut seen: FxHashSet<(&'static str, String)> = FxHashSet::default();
    operations
        .iter()
        .filter(|op| !seen.insert((op.marker.label(), op.name.value())))
        .map(|op| {
            syn::Error::new_spanned(
                &op.ident,
                format!(
                    "operation `{}` is declared twice as a {} on this module",
                    op.name.value(),
                    op.marker.label()
                ),
            )
        })
        .collect()
}

fn push_error(slot: &mut Option<syn::Error>, err: syn::Error) {
    match slot {
        Some(existing) => existing.combine(err),
        None => *slot = Some(err),
    }
}

/// The public method that replaces a marked body and routes through the host.
fn redirect(op: &Operation) -> TokenStream {
    let Operation { vis, ident, name, output, docs, .. } = op;
    let params = op.params.iter().map(|(ident, ty)| quote! { #ident: #ty });
    let encoded = op.params.iter().map(|(ident, _)| quote! { ::storemod_core::encode(&#ident)? });

    let call = match op.marker {
        Marker::Getter => quote! { .read(#name, __storemod_args) },
        Marker::Mutation => {
            let options = if op.silent {
                quote! { ::core::option::Option::Some(::storemod_core::CommitOptions { silent: true }) }
            } else {
                quote! { ::core::option::Option::None }
            };
            quote! { .commit(#name, __storemod_args, #options) }
        },
        Marker::Action => quote! { .dispatch(#name, __storemod_args) },
    };

    quote! {
        #(#docs)*
        #vis fn #ident(&self, #(#params),*) -> ::core::result::Result<#output, ::storemod_core::ModuleError> {
            let __storemod_args: ::storemod_core::Args = ::std::vec![#(#encoded),*];
            ::storemod_core::StoreModule::base(self)#call
        }
    }
}

/// The table insertion that wraps a marked body into its registry entry.
fn registration(op: &Operation) -> TokenStream {
    let Operation { name, body_ident, .. } = op;
    let idents: Vec<_> = op.params.iter().map(|(ident, _)| ident).collect();
    let value = if op.fallible {
        quote! {
            ::core::result::Result::map_err(
                this.#body_ident(#(#idents),*),
                ::core::convert::Into::<::storemod_core::ModuleError>::into,
            )?
        }
    } else {
        quote! { this.#body_ident(#(#idents),*) }
    };

    if op.marker == Marker::Getter && op.params.is_empty() {
        return quote! {
            table.add_getter(
                #name,
                ::storemod_core::GetterEntry::accessor(
                    #name,
                    |this: &Self| -> ::core::result::Result<::storemod_core::Value, ::storemod_core::ModuleError> {
                        let value = #value;
                        ::storemod_core::encode(&value)
                    },
                ),
            )?;
        };
    }

    let decode = if op.params.is_empty() {
        quote! { let _ = __storemod_args; }
    } else {
        let lets = op.params.iter().map(|(ident, ty)| quote! { let #ident: #ty = reader.next_arg()?; });
        quote! {
            let mut reader = ::storemod_core::ArgReader::new(#name, __storemod_args);
            #(#lets)*
        }
    };
    let body = quote! {
        |this: &Self, __storemod_args: ::storemod_core::Args| -> ::core::result::Result<::storemod_core::Value, ::storemod_core::ModuleError> {
            #decode
            let value = #value;
            ::storemod_core::encode(&value)
        }
    };

    match op.marker {
        Marker::Getter => quote! {
            table.add_getter(#name, ::storemod_core::GetterEntry::callable(#name, #body))?;
        },
        Marker::Mutation => quote! {
            table.add_mutation(#name, ::storemod_core::MutationEntry::new(#name, #body))?;
        },
        Marker::Action => quote! {
            table.add_action(#name, ::storemod_core::ActionEntry::new(#name, #body))?;
        },
    }
}
